//! Cooperative suspend/resume of the console tasks.
//!
//! # Protocol
//!
//! ```text
//! Sleep controller          OutputSleep / InputSleep         Task
//! ────────────────          ────────────────────────         ────
//! suspend_all() ──────────▶ enqueue Pause / interrupt rx ──▶ reaches pause point
//!                           wait_suspended()  ◀──── ack ──── gate.park()
//!                           device.disable()                    (parked)
//! resume_all()  ──────────▶ device.enable()
//!                           gate.resume()  ──────────────────▶ continues
//! ```
//!
//! Tasks only park at their own pause points: the drain task after it
//! pops the sentinel, the editor task after an interrupted receive. The
//! sentinel sits at the FIFO tail, so everything queued before the
//! suspend request is transmitted before the drain task parks.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::console::RxInterrupt;
use crate::output::TermOut;

/// Enable/disable hooks of a serial device.
///
/// Called only by the sleep hooks, never concurrently with send/recv on
/// the same device.
pub trait DevicePower: Send + Sync {
    fn enable(&self);
    fn disable(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Running,
    Suspended,
    Resuming,
}

/// Single-slot suspend acknowledgment between a task and its coordinator.
///
/// The task calls [`TaskGate::park`]; the coordinator waits for the
/// acknowledgment with [`TaskGate::wait_suspended`] and later releases
/// the task with [`TaskGate::resume`].
pub struct TaskGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl TaskGate {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Running),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, GateState>) -> MutexGuard<'a, GateState> {
        self.changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Called by the task itself: acknowledge suspension and block until resumed.
    pub fn park(&self) {
        let mut state = self.lock();
        *state = GateState::Suspended;
        self.changed.notify_all();
        while *state == GateState::Suspended {
            state = self.wait(state);
        }
        *state = GateState::Running;
        self.changed.notify_all();
    }

    /// Block until the task has parked.
    pub fn wait_suspended(&self) {
        let mut state = self.lock();
        while *state != GateState::Suspended {
            state = self.wait(state);
        }
    }

    /// Release a parked task. No effect on a running task.
    pub fn resume(&self) {
        let mut state = self.lock();
        if *state == GateState::Suspended {
            *state = GateState::Resuming;
            self.changed.notify_all();
        }
    }

    pub fn is_suspended(&self) -> bool {
        *self.lock() == GateState::Suspended
    }
}

impl Default for TaskGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Participant in a system-wide sleep transition.
pub trait SleepHook: Send + Sync {
    /// Bring the participant to rest. Returns once it has stopped.
    fn suspend(&self);
    /// Undo [`SleepHook::suspend`].
    fn resume(&self);
}

/// Ordering class of a hook in the suspend sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SleepPriority {
    /// Suspended before everything else, resumed last.
    SuspendFirst,
    /// Suspended after everything else, resumed first.
    SuspendLast,
}

/// Sleep hook for the output drain task.
pub struct OutputSleep {
    out: Arc<TermOut>,
    gate: Arc<TaskGate>,
    device: Option<Arc<dyn DevicePower>>,
    log_state: bool,
}

impl OutputSleep {
    pub fn new(
        out: Arc<TermOut>,
        gate: Arc<TaskGate>,
        device: Option<Arc<dyn DevicePower>>,
        log_state: bool,
    ) -> Self {
        Self {
            out,
            gate,
            device,
            log_state,
        }
    }
}

impl SleepHook for OutputSleep {
    fn suspend(&self) {
        if self.log_state {
            let _ = self.out.add_str("tout: suspend request\n");
            let _ = self.out.add_str("---------------------\n");
        }
        self.out.request_pause();
        self.gate.wait_suspended();
        if let Some(device) = &self.device {
            device.disable();
        }
    }

    fn resume(&self) {
        if let Some(device) = &self.device {
            device.enable();
        }
        self.gate.resume();
    }
}

/// Sleep hook for the line editor task.
pub struct InputSleep {
    gate: Arc<TaskGate>,
    interrupt: Arc<dyn RxInterrupt>,
    device: Option<Arc<dyn DevicePower>>,
}

impl InputSleep {
    pub fn new(
        gate: Arc<TaskGate>,
        interrupt: Arc<dyn RxInterrupt>,
        device: Option<Arc<dyn DevicePower>>,
    ) -> Self {
        Self {
            gate,
            interrupt,
            device,
        }
    }
}

impl SleepHook for InputSleep {
    fn suspend(&self) {
        self.interrupt.interrupt();
        self.gate.wait_suspended();
        if let Some(device) = &self.device {
            device.disable();
        }
    }

    fn resume(&self) {
        if let Some(device) = &self.device {
            device.enable();
        }
        self.gate.resume();
    }
}

/// Registry of sleep hooks, run in priority order.
#[derive(Default)]
pub struct SleepController {
    hooks: Mutex<Vec<(SleepPriority, Arc<dyn SleepHook>)>>,
}

impl SleepController {
    pub fn new() -> Self {
        Self::default()
    }

    fn hooks(&self) -> Vec<(SleepPriority, Arc<dyn SleepHook>)> {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add a hook. Registration order is kept within one priority.
    pub fn register(&self, priority: SleepPriority, hook: Arc<dyn SleepHook>) {
        let mut hooks = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
        hooks.push((priority, hook));
        hooks.sort_by_key(|(p, _)| *p);
    }

    /// Suspend every hook, `SuspendFirst` ones first.
    pub fn suspend_all(&self) {
        let hooks = self.hooks();
        log::debug!("sleep: suspending {} hooks", hooks.len());
        for (_, hook) in &hooks {
            hook.suspend();
        }
    }

    /// Resume every hook in reverse suspend order.
    pub fn resume_all(&self) {
        for (_, hook) in self.hooks().iter().rev() {
            hook.resume();
        }
        log::debug!("sleep: resumed");
    }

    pub fn len(&self) -> usize {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
