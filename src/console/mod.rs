//! Serial console input
//!
//! One task, one receiver: bytes are assembled into lines with local
//! echo and editing, echo goes out through the shared [`crate::TermOut`].

pub mod editor;
pub mod interruptible;
pub mod line_buffer;
pub mod task;

pub use editor::{EchoSink, EditorState, LineEditor, LineFn, ERASE};
pub use interruptible::{InterruptFlag, InterruptibleRx, PollRead};
pub use line_buffer::LineBuffer;
pub use task::{InputStep, InputTask, RecvOutcome, RxInterrupt, SerialRx};
