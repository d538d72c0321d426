//! Console UART on UART1.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//! ESP32-S3 GPIO7 (RX) ◀────── USB-UART TX
//! ```

use std::time::Duration;

use esp_idf_svc::hal::delay::{TickType, BLOCK};
use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, UartDriver, UartRxDriver, UartTxDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::{self, EspError};

use crate::console::{PollRead, RecvOutcome};
use crate::output::SerialTx;
use crate::power::DevicePower;

/// UART line settings.
pub struct ConsoleUartConfig {
    pub baud_rate: u32,
}

impl Default for ConsoleUartConfig {
    fn default() -> Self {
        Self { baud_rate: 115200 }
    }
}

/// Install the UART driver and split it into the two task ends.
pub fn init_console_uart(
    uart: impl Peripheral<P = uart::UART1> + 'static,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'static,
    rx_pin: impl Peripheral<P = impl gpio::InputPin> + 'static,
    config: &ConsoleUartConfig,
) -> Result<(UartTx, UartRx, sys::uart_port_t), EspError> {
    let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud_rate));

    let driver = UartDriver::new(
        uart,
        tx_pin,
        rx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )?;
    let port = driver.port();
    let (tx, rx) = driver.into_split();
    Ok((UartTx(tx), UartRx(rx), port))
}

/// Drain task end.
pub struct UartTx(UartTxDriver<'static>);

impl SerialTx for UartTx {
    type Error = EspError;

    fn send(&mut self, bytes: &[u8]) -> Result<(), EspError> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = self.0.write(rest)?;
            rest = &rest[n..];
        }
        Ok(())
    }
}

/// Editor task end.
pub struct UartRx(UartRxDriver<'static>);

impl PollRead for UartRx {
    fn poll_byte(&mut self, wait: Duration) -> Option<RecvOutcome> {
        let mut byte = [0u8; 1];
        let ticks = TickType::new_millis(wait.as_millis() as u64).ticks();
        match self.0.read(&mut byte, ticks) {
            Ok(1) => Some(RecvOutcome::Ready(byte[0])),
            Ok(_) => None,
            Err(_) => Some(RecvOutcome::Fault),
        }
    }
}

/// Sleep hooks for one UART direction.
pub enum UartPower {
    /// Wait for the TX FIFO to empty before sleep.
    Tx(sys::uart_port_t),
    /// Drop stale RX bytes on wake.
    Rx(sys::uart_port_t),
}

impl DevicePower for UartPower {
    fn enable(&self) {
        if let Self::Rx(port) = *self {
            // SAFETY: driver installed on `port` for the firmware lifetime.
            unsafe {
                sys::uart_flush_input(port);
            }
        }
    }

    fn disable(&self) {
        if let Self::Tx(port) = *self {
            // SAFETY: as above.
            unsafe {
                sys::uart_wait_tx_done(port, BLOCK);
            }
        }
    }
}
