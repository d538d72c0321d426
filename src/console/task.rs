//! Line editor task: receive loop around [`LineEditor`].

use std::sync::Arc;
use std::time::Duration;

use crate::output::TermOut;
use crate::power::TaskGate;

use super::editor::LineEditor;

/// Result of one receive call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecvOutcome {
    /// A byte arrived.
    Ready(u8),
    /// Framing, parity or overrun error on the line.
    Fault,
    /// The receive was cut short on request (sleep transition).
    Interrupted,
}

/// Serial receiver used by the editor task.
pub trait SerialRx: Send {
    /// Wait for one byte. `None` waits indefinitely.
    fn recv(&mut self, timeout: Option<Duration>) -> RecvOutcome;
}

/// Handle that makes a blocked [`SerialRx::recv`] return
/// [`RecvOutcome::Interrupted`].
pub trait RxInterrupt: Send + Sync {
    fn interrupt(&self);
}

/// What one [`InputTask::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputStep {
    Byte,
    Fault,
    /// Task parked and was resumed.
    Slept,
}

/// The editor together with its byte source.
pub struct InputTask<R> {
    editor: LineEditor,
    rx: R,
    out: Arc<TermOut>,
    gate: Arc<TaskGate>,
    /// Park on `Interrupted` instead of treating it as a line fault.
    suspendable: bool,
    log_state: bool,
}

impl<R: SerialRx> InputTask<R> {
    pub fn new(
        editor: LineEditor,
        rx: R,
        out: Arc<TermOut>,
        gate: Arc<TaskGate>,
        suspendable: bool,
        log_state: bool,
    ) -> Self {
        Self {
            editor,
            rx,
            out,
            gate,
            suspendable,
            log_state,
        }
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// Receive and handle one byte (or fault, or interruption).
    pub fn step(&mut self) -> InputStep {
        match self.rx.recv(None) {
            RecvOutcome::Ready(byte) => {
                let mut sink: &TermOut = &self.out;
                self.editor.process_byte(byte, &mut sink);
                InputStep::Byte
            }
            RecvOutcome::Interrupted if self.suspendable => {
                if self.log_state {
                    let _ = self.out.add_str("tin: TIN suspended\n");
                }
                self.gate.park();
                if self.log_state {
                    let _ = self.out.add_str("tin: TIN resumed\n");
                }
                InputStep::Slept
            }
            RecvOutcome::Fault | RecvOutcome::Interrupted => {
                self.editor.receive_fault();
                InputStep::Fault
            }
        }
    }

    /// Task body. Runs forever.
    pub fn run(mut self) -> ! {
        let _ = self
            .out
            .add_msg(format_args!("tin: row={}\n", self.editor.raw_line().len()));
        loop {
            self.step();
        }
    }
}
