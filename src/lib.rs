//! # RustTermIO
//!
//! Serial console I/O subsystem: buffered, non-blocking formatted output
//! with drop-on-overflow, and a line-editing input task with local echo.
//!
//! ## Architecture
//!
//! Producers never touch the UART. Every message is formatted into a
//! length-prefixed frame inside one circular byte arena, and the frame's
//! position goes into a bounded dispatch queue:
//! - Producers: [`TermOut::add_msg`] / [`tout!`], from any task
//! - Consumer: the TOUT drain task, the only writer to the transmitter
//! - Input: the TIN task echoes through the same pipeline
//!
//! When the arena or the queue has no room the message is dropped and
//! counted, never waited for.

pub mod admission;
pub mod config;
pub mod console;
pub mod error;
pub mod fault;
pub mod logger;
pub mod output;
pub mod power;
pub mod queue;
pub mod shell;
pub mod stats;
pub mod store;
pub mod system;

#[cfg(target_os = "espidf")]
pub mod hal;

/// Firmware version string, stamped by build.rs.
pub const VERSION: &str = env!("VERSION_STRING");

pub use admission::Rejection;
pub use config::{InputConfig, OutputConfig, TermConfig};
pub use console::{LineEditor, RecvOutcome, SerialRx};
pub use error::StartError;
pub use fault::{critical_exit, CritCode, FaultState};
pub use logger::TermLogger;
pub use output::{SerialTx, TermOut, TermWriter};
pub use power::{DevicePower, SleepController, SleepPriority};
pub use shell::ShellContext;
pub use stats::StatsSnapshot;
pub use system::TermSystem;
