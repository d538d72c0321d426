//! Command shell run as the line editor's line callback.
//!
//! Replies go through the same output pipeline as every other producer.

pub mod commands;
pub mod error;
pub mod parser;

use core::fmt::Write;

use crate::console::LineFn;
use crate::output::TermWriter;

pub use commands::{execute, ShellContext, COMMANDS};
pub use error::ShellError;
pub use parser::CommandLine;

impl ShellContext {
    /// Parse and run one committed line, printing errors.
    pub fn handle_line(&self, line: &str) {
        let cmd = CommandLine::parse(line);
        let mut out = TermWriter::new(&self.out);
        if let Err(e) = execute(&cmd, self, &mut out) {
            let _ = writeln!(out, "{}", e);
        }
    }

    /// Wrap into a callback for [`crate::console::LineEditor`].
    pub fn into_line_fn(self) -> LineFn {
        Box::new(move |line: &str| self.handle_line(line))
    }
}
