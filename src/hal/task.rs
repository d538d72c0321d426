//! FreeRTOS settings for the next spawned std thread.

use esp_idf_svc::hal::task::thread::ThreadSpawnConfiguration;

use crate::system::{TIN_TASK, TOUT_TASK};

/// Task priorities. Input above output so echo never waits on a drain.
const TOUT_PRIORITY: u8 = 5;
const TIN_PRIORITY: u8 = 6;

/// Apply name, stack and priority to the next `std::thread` spawn.
pub fn configure_next_thread(name: &'static str, stack_size: usize) {
    let (task_name, priority): (&'static [u8], u8) = match name {
        TOUT_TASK => (b"TOUT\0", TOUT_PRIORITY),
        TIN_TASK => (b"TIN\0", TIN_PRIORITY),
        _ => (b"TERM\0", TOUT_PRIORITY),
    };

    let conf = ThreadSpawnConfiguration {
        name: Some(task_name),
        stack_size,
        priority,
        ..Default::default()
    };
    if let Err(e) = conf.set() {
        log::warn!("task {}: spawn config rejected: {:?}", name, e);
    }
}
