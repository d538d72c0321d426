//! ESP-IDF glue for the console subsystem.
//!
//! Thin wrappers around the UART driver and FreeRTOS task settings.
//! Console logic stays in the core modules, this is just I/O.

pub mod task;
pub mod uart;

pub use uart::{init_console_uart, ConsoleUartConfig, UartPower, UartRx, UartTx};
