//! Output pipeline counters.
//!
//! Every counter is monotonic and written by exactly one side:
//! producers bump `ignored`, `queue_full` and `format_errors` under the
//! producer mutex, the drain task bumps `printed` and `send_errors`.
//! Reporters read a [`StatsSnapshot`].

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe counter block.
pub struct Stats {
    /// Frames handed to the transmitter successfully.
    printed: AtomicU32,
    /// Messages dropped because they would overlap undrained frames.
    ignored: AtomicU32,
    /// Messages dropped because the dispatch queue was full.
    queue_full: AtomicU32,
    /// Transmit calls that reported failure.
    send_errors: AtomicU32,
    /// Messages whose formatting failed.
    format_errors: AtomicU32,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            printed: AtomicU32::new(0),
            ignored: AtomicU32::new(0),
            queue_full: AtomicU32::new(0),
            send_errors: AtomicU32::new(0),
            format_errors: AtomicU32::new(0),
        }
    }

    #[inline]
    pub(crate) fn inc_printed(&self) {
        self.printed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_queue_full(&self) {
        self.queue_full.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_send_errors(&self) {
        self.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_format_errors(&self) {
        self.format_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            printed: self.printed.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            queue_full: self.queue_full.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            format_errors: self.format_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the counters at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub printed: u32,
    pub ignored: u32,
    pub queue_full: u32,
    pub send_errors: u32,
    pub format_errors: u32,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mprn={} mign={} qfull={} serr={} prnerr={}",
            self.printed, self.ignored, self.queue_full, self.send_errors, self.format_errors
        )
    }
}
