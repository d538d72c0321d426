//! Subsystem start: builds the shared context and spawns both tasks.
//!
//! ```text
//!              ┌──────────── Arc<TermOut> ────────────┐
//!              │                                      │
//!   TOUT: run_drain(SerialTx)          TIN: InputTask(SerialRx, LineEditor)
//!              │                                      │
//!          TaskGate ◀── OutputSleep      InputSleep ──▶ TaskGate
//!                           └──── SleepController ────┘
//! ```

use std::sync::Arc;
use std::thread;

use crate::config::TermConfig;
use crate::console::{InputTask, LineEditor, LineFn, RxInterrupt, SerialRx};
use crate::error::StartError;
use crate::output::{run_drain, SerialTx, TermOut, CLEAR_SCREEN};
use crate::power::{DevicePower, InputSleep, OutputSleep, SleepController, SleepPriority, TaskGate};

/// Drain task name.
pub const TOUT_TASK: &str = "TOUT";
/// Editor task name.
pub const TIN_TASK: &str = "TIN";

/// Hosted threads get at least this much stack.
#[cfg(not(target_os = "espidf"))]
const HOST_MIN_STACK: usize = 64 * 1024;

/// Running console subsystem.
pub struct TermSystem {
    config: TermConfig,
    out: Arc<TermOut>,
    sleep: Arc<SleepController>,
    input_attached: bool,
}

/// Spawn a named task, applying platform task settings first.
fn spawn_task<F>(name: &'static str, stack_size: usize, body: F) -> Result<(), StartError>
where
    F: FnOnce() + Send + 'static,
{
    #[cfg(target_os = "espidf")]
    crate::hal::task::configure_next_thread(name, stack_size);
    #[cfg(not(target_os = "espidf"))]
    let stack_size = stack_size.max(HOST_MIN_STACK);

    thread::Builder::new()
        .name(name.into())
        .stack_size(stack_size)
        .spawn(body)
        .map(|_| ())
        .map_err(|source| StartError::TaskSpawn { name, source })
}

impl TermSystem {
    /// Validate `config`, build the output pipeline and start the drain task.
    ///
    /// `power` is the transmitter's enable/disable hook pair, used by the
    /// sleep protocol when it is active.
    pub fn start<T>(
        config: TermConfig,
        mut tx: T,
        power: Option<Arc<dyn DevicePower>>,
    ) -> Result<Self, StartError>
    where
        T: SerialTx + 'static,
    {
        config.validate()?;

        let out = Arc::new(TermOut::new(&config.output)?);
        let sleep = Arc::new(SleepController::new());
        let gate = Arc::new(TaskGate::new());

        if config.output.send_cls_on_start {
            let _ = out.add_str(CLEAR_SCREEN);
        }
        let _ = out.add_msg(format_args!(
            "tout: row={} que={} buf={}\n",
            config.output.max_row_len, config.output.max_rows_in_queue, config.output.buffer_size
        ));

        {
            let out = Arc::clone(&out);
            let gate = Arc::clone(&gate);
            spawn_task(TOUT_TASK, config.output.stack_size, move || {
                run_drain(&out, &mut tx, &gate)
            })?;
        }

        if config.sleep_protocol {
            sleep.register(
                SleepPriority::SuspendLast,
                Arc::new(OutputSleep::new(
                    Arc::clone(&out),
                    gate,
                    power,
                    config.log_sleep_state,
                )),
            );
        }

        log::debug!("term-io: output started");
        Ok(Self {
            config,
            out,
            sleep,
            input_attached: false,
        })
    }

    /// Start the line editor task on `rx`.
    ///
    /// `interrupt` must cut short a pending `rx.recv()`; it is used only
    /// when the sleep protocol is active.
    pub fn attach_input<R>(
        &mut self,
        rx: R,
        interrupt: Arc<dyn RxInterrupt>,
        power: Option<Arc<dyn DevicePower>>,
        on_line: Option<LineFn>,
    ) -> Result<(), StartError>
    where
        R: SerialRx + 'static,
    {
        if self.input_attached {
            return Err(StartError::InputAttached);
        }

        let gate = Arc::new(TaskGate::new());
        let editor = LineEditor::new(&self.config.input, on_line);
        let task = InputTask::new(
            editor,
            rx,
            Arc::clone(&self.out),
            Arc::clone(&gate),
            self.config.sleep_protocol,
            self.config.log_sleep_state,
        );

        spawn_task(TIN_TASK, self.config.input.stack_size, move || task.run())?;

        if self.config.sleep_protocol {
            self.sleep.register(
                SleepPriority::SuspendFirst,
                Arc::new(InputSleep::new(gate, interrupt, power)),
            );
        }
        self.input_attached = true;
        log::debug!("term-io: input started");
        Ok(())
    }

    /// Shared output context, for producers.
    pub fn output(&self) -> &Arc<TermOut> {
        &self.out
    }

    /// Sleep controller with the console hooks registered.
    pub fn sleep(&self) -> &Arc<SleepController> {
        &self.sleep
    }
}
