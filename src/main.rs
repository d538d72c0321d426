//! RustTermIO - console demo firmware
//!
//! Brings up the console pipeline on UART1 (GPIO6 TX, GPIO7 RX) with the
//! command shell on the input side. Built for a host, the same subsystem
//! runs on stdin/stdout.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::LevelFilter;
use rust_term_io::console::InterruptibleRx;
use rust_term_io::{critical_exit, ShellContext, TermConfig, TermLogger, TermSystem, VERSION};

#[cfg(target_os = "espidf")]
fn main() {
    use esp_idf_svc::hal::peripherals::Peripherals;
    use rust_term_io::hal::{init_console_uart, ConsoleUartConfig, UartPower};
    use rust_term_io::CritCode;

    esp_idf_svc::sys::link_patches();

    let peripherals = match Peripherals::take() {
        Ok(p) => p,
        Err(e) => critical_exit(CritCode::HardwareFault, e.code() as u32),
    };
    let (tx, rx, port) = match init_console_uart(
        peripherals.uart1,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        &ConsoleUartConfig::default(),
    ) {
        Ok(parts) => parts,
        Err(e) => critical_exit(CritCode::HardwareFault, e.code() as u32),
    };

    let mut system = match TermSystem::start(
        TermConfig::default(),
        tx,
        Some(Arc::new(UartPower::Tx(port))),
    ) {
        Ok(s) => s,
        Err(e) => critical_exit(e.crit_code(), e.detail()),
    };
    let _ = TermLogger::init(Arc::clone(system.output()), LevelFilter::Info);

    let rx = InterruptibleRx::new(rx);
    let interrupt = Arc::new(rx.interrupt_handle());
    let shell = ShellContext {
        out: Arc::clone(system.output()),
        sleep: Arc::clone(system.sleep()),
    };
    if let Err(e) = system.attach_input(
        rx,
        interrupt,
        Some(Arc::new(UartPower::Rx(port))),
        Some(shell.into_line_fn()),
    ) {
        critical_exit(e.crit_code(), e.detail());
    }

    log::info!("{}", VERSION);

    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use host::{StdinSource, StdoutTx};

    let mut system = match TermSystem::start(TermConfig::default(), StdoutTx::new(), None) {
        Ok(s) => s,
        Err(e) => critical_exit(e.crit_code(), e.detail()),
    };
    let _ = TermLogger::init(Arc::clone(system.output()), LevelFilter::Info);

    let (source, eof) = StdinSource::spawn();
    let rx = InterruptibleRx::new(source);
    let interrupt = Arc::new(rx.interrupt_handle());
    let shell = ShellContext {
        out: Arc::clone(system.output()),
        sleep: Arc::clone(system.sleep()),
    };
    if let Err(e) = system.attach_input(rx, interrupt, None, Some(shell.into_line_fn())) {
        critical_exit(e.crit_code(), e.detail());
    }

    log::info!("{}", VERSION);

    // Runs until stdin closes, then lets the drain task catch up.
    let _ = eof.recv();
    thread::sleep(Duration::from_millis(200));
    system.output().report_stats();
    thread::sleep(Duration::from_millis(50));
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::{self, Read, Write};
    use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
    use std::thread;
    use std::time::Duration;

    use rust_term_io::console::{PollRead, RecvOutcome};
    use rust_term_io::SerialTx;

    /// Transmitter on stdout.
    pub struct StdoutTx(io::Stdout);

    impl StdoutTx {
        pub fn new() -> Self {
            Self(io::stdout())
        }
    }

    impl SerialTx for StdoutTx {
        type Error = io::Error;

        fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
            let mut lock = self.0.lock();
            lock.write_all(bytes)?;
            lock.flush()
        }
    }

    /// Receiver on stdin. A line-buffered terminal delivers `\n` where a
    /// serial terminal sends `\r`, so it is mapped.
    pub struct StdinSource {
        bytes: Receiver<u8>,
        eof: Option<Sender<()>>,
    }

    impl StdinSource {
        /// Start the stdin reader. The second end fires once stdin is
        /// closed and every byte has been handed out.
        pub fn spawn() -> (Self, Receiver<()>) {
            let (byte_tx, bytes) = mpsc::channel();
            let (eof_tx, eof) = mpsc::channel();

            thread::spawn(move || {
                for byte in io::stdin().lock().bytes() {
                    let Ok(byte) = byte else { break };
                    let byte = if byte == b'\n' { b'\r' } else { byte };
                    if byte_tx.send(byte).is_err() {
                        break;
                    }
                }
            });

            (Self { bytes, eof: Some(eof_tx) }, eof)
        }
    }

    impl PollRead for StdinSource {
        fn poll_byte(&mut self, wait: Duration) -> Option<RecvOutcome> {
            match self.bytes.recv_timeout(wait) {
                Ok(byte) => Some(RecvOutcome::Ready(byte)),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    if let Some(eof) = self.eof.take() {
                        let _ = eof.send(());
                    }
                    thread::sleep(wait);
                    None
                }
            }
        }
    }
}
