//! Module: config
//!
//! Purpose: Start-time configuration of the console subsystem.
//!
//! All parameters are fixed once [`crate::TermSystem::start`] runs; there is
//! no runtime reconfiguration. [`TermConfig::validate`] rejects combinations
//! the frame format cannot represent.

use thiserror::Error;

/// Largest payload a frame can carry: the length byte stores `payload + 1`.
pub const MAX_FRAME_PAYLOAD: usize = u8::MAX as usize - 1;

/// Output pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    /// Arena capacity in bytes (`C`).
    pub buffer_size: usize,
    /// Maximum payload of one row (`MAX_ROW_LEN`).
    pub max_row_len: usize,
    /// Dispatch queue capacity (`Q`).
    pub max_rows_in_queue: usize,
    /// Queue a clear-screen sequence right after start.
    pub send_cls_on_start: bool,
    /// Drain task stack size in bytes.
    pub stack_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            buffer_size: 2048,
            max_row_len: 80,
            max_rows_in_queue: 32,
            send_cls_on_start: false,
            stack_size: 4096,
        }
    }
}

/// Line editor configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputConfig {
    /// Maximum characters in one input line.
    pub max_row_len: usize,
    /// Local echo state after start.
    pub echo_on_start: bool,
    /// Editor task stack size in bytes.
    pub stack_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_row_len: 64,
            echo_on_start: true,
            stack_size: 4096,
        }
    }
}

/// Whole-subsystem configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermConfig {
    pub output: OutputConfig,
    pub input: InputConfig,
    /// Register both tasks with the sleep controller.
    pub sleep_protocol: bool,
    /// Announce suspend/resume transitions on the console.
    pub log_sleep_state: bool,
}

/// Configuration rejected at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("row length {0} outside 1..={max}", max = MAX_FRAME_PAYLOAD)]
    RowLength(usize),
    #[error("buffer of {size} bytes cannot hold a {row} byte row")]
    BufferTooSmall { size: usize, row: usize },
    #[error("queue must hold at least one row")]
    EmptyQueue,
    #[error("input line length must be non-zero")]
    EmptyInputLine,
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_row_len == 0 || self.max_row_len > MAX_FRAME_PAYLOAD {
            return Err(ConfigError::RowLength(self.max_row_len));
        }
        // A maximal frame plus one byte of slack must fit, otherwise the
        // writer could lap its own length byte.
        if self.buffer_size <= self.max_row_len + 1 {
            return Err(ConfigError::BufferTooSmall {
                size: self.buffer_size,
                row: self.max_row_len,
            });
        }
        if self.max_rows_in_queue == 0 {
            return Err(ConfigError::EmptyQueue);
        }
        Ok(())
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_row_len == 0 {
            return Err(ConfigError::EmptyInputLine);
        }
        Ok(())
    }
}

impl TermConfig {
    /// Validate both halves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.output.validate()?;
        self.input.validate()
    }
}
