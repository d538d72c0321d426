//! `log` facade sink.
//!
//! Routes `log::info!` and friends from anywhere in the firmware into the
//! console output pipeline, so they share its drop-on-overflow policy and
//! never block the caller on the UART.
//!
//! Format: `[uptime_ms] LEVEL: message\n`

use std::sync::Arc;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::output::TermOut;

/// Logger writing into a [`TermOut`].
pub struct TermLogger {
    out: Arc<TermOut>,
    level: LevelFilter,
    boot: Instant,
}

impl TermLogger {
    pub fn new(out: Arc<TermOut>, level: LevelFilter) -> Self {
        Self {
            out,
            level,
            boot: Instant::now(),
        }
    }

    /// Install as the global logger.
    pub fn init(out: Arc<TermOut>, level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(out, level)))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for TermLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = self.out.add_msg(format_args!(
            "[{:8}] {}: {}\n",
            self.boot.elapsed().as_millis(),
            record.level(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use crate::output::{DrainStep, SerialTx};

    struct Capture(Vec<Vec<u8>>);

    impl SerialTx for Capture {
        type Error = ();
        fn send(&mut self, bytes: &[u8]) -> Result<(), ()> {
            self.0.push(bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_record_formatted_into_pipeline() {
        let out = Arc::new(TermOut::new(&OutputConfig::default()).unwrap());
        let logger = TermLogger::new(Arc::clone(&out), LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("voltage {}", 3))
                .build(),
        );
        // Filtered out
        logger.log(
            &Record::builder()
                .level(log::Level::Debug)
                .args(format_args!("noise"))
                .build(),
        );

        assert_eq!(out.queue().len(), 1);

        let mut tx = Capture(Vec::new());
        let mut render = out.render_buffer();
        assert_eq!(out.drain_next(&mut tx, &mut render), DrainStep::Sent);

        let line = String::from_utf8(tx.0.remove(0)).unwrap();
        assert!(line.contains("WARN: voltage 3"));
        assert!(line.ends_with("\r\n"));
    }
}
