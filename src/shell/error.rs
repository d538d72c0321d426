//! Shell error types

use thiserror::Error;

/// Shell error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShellError {
    /// E01: Unknown command
    #[error("E01: unknown command")]
    UnknownCommand,
    /// E02: Invalid value format
    #[error("E02: invalid value")]
    InvalidValue,
    /// E03: Value out of allowed range
    #[error("E03: out of range")]
    OutOfRange,
    /// E04: Feature not enabled in this build/configuration
    #[error("E04: not available")]
    Unavailable,
}
