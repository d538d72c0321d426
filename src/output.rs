//! Asynchronous console output.
//!
//! # Architecture
//!
//! ```text
//! Any task               TermOut                         TOUT task
//! ────────               ───────                         ─────────
//! tout!() ──admit──▶ [arena frames] + [dispatch queue] ──▶ render ──▶ SerialTx
//! log::info!()        producer mutex    FIFO                \n → \r\n
//! LineEditor echo
//! ```
//!
//! # Rules
//!
//! - Producers never block on the transmitter: full or overlapping
//!   messages are dropped and counted
//! - The drain task is the only consumer; it copies a frame out before
//!   removing it from the queue
//! - No lock is held while transmitting

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::admission::{format_row, Admitter, Rejection, RowBuf};
use crate::config::{ConfigError, OutputConfig, MAX_FRAME_PAYLOAD};
use crate::power::TaskGate;
use crate::queue::{DispatchQueue, Entry};
use crate::stats::{Stats, StatsSnapshot};
use crate::store::Arena;

/// Clear screen and home the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[0;0f";

/// Serial transmitter used by the drain task.
pub trait SerialTx: Send {
    type Error: fmt::Debug;

    /// Send all of `bytes`. Called only from the drain task.
    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Outcome of one drain step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStep {
    /// Frame rendered and transmitted.
    Sent,
    /// Frame rendered, transmitter reported failure. The frame is gone.
    SendFailed,
    /// Pause sentinel consumed; the caller should suspend.
    Paused,
}

/// Rewrite a trailing bare `\n` as `\r\n`.
///
/// `buf[..len]` holds the payload and `buf` has room for one extra byte.
/// Returns the rendered length.
pub fn render_frame(buf: &mut [u8], len: usize) -> usize {
    if len > 0 && buf[len - 1] == b'\n' && (len < 2 || buf[len - 2] != b'\r') {
        buf[len - 1] = b'\r';
        buf[len] = b'\n';
        return len + 1;
    }
    len
}

/// Shared console output context.
///
/// Constructed once at start and shared by `Arc` between producers, the
/// drain task and the sleep hooks.
pub struct TermOut {
    /// Serialises admissions. Also held while queueing the pause sentinel.
    producer: Mutex<Admitter>,
    /// Frame bytes. Held briefly for writing or copying out.
    arena: Mutex<Arena>,
    queue: DispatchQueue,
    stats: Stats,
    enabled: AtomicBool,
    config: OutputConfig,
}

impl TermOut {
    /// Build the output context from a configuration that passes
    /// [`OutputConfig::validate`].
    pub fn new(config: &OutputConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            producer: Mutex::new(Admitter::new()),
            arena: Mutex::new(Arena::new(config.buffer_size)),
            queue: DispatchQueue::new(config.max_rows_in_queue),
            stats: Stats::new(),
            enabled: AtomicBool::new(true),
            config: config.clone(),
        })
    }

    fn producer(&self) -> MutexGuard<'_, Admitter> {
        self.producer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn arena(&self) -> MutexGuard<'_, Arena> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a formatted message for output.
    ///
    /// Never waits for the transmitter. Rejected messages are counted
    /// (except `Disabled` and `Empty`) and dropped.
    pub fn add_msg(&self, args: fmt::Arguments<'_>) -> Result<(), Rejection> {
        if !self.enabled.load(Ordering::Acquire) {
            return Err(Rejection::Disabled);
        }

        // Formatting runs outside both locks; `Display` code may log.
        let mut row: RowBuf = [0; MAX_FRAME_PAYLOAD];
        let result = format_row(args, &mut row[..self.config.max_row_len]).and_then(|len| {
            let mut producer = self.producer();
            let mut arena = self.arena();
            producer.admit(&row[..len], &mut arena, &self.queue)
        });

        match result {
            Ok(_) => Ok(()),
            Err(reason) => {
                match reason {
                    Rejection::Overlap | Rejection::Paused => self.stats.inc_ignored(),
                    Rejection::QueueFull => self.stats.inc_queue_full(),
                    Rejection::Format | Rejection::Oversize => self.stats.inc_format_errors(),
                    Rejection::Disabled | Rejection::Empty => {}
                }
                Err(reason)
            }
        }
    }

    /// Queue a plain string.
    #[inline]
    pub fn add_str(&self, s: &str) -> Result<(), Rejection> {
        self.add_msg(format_args!("{}", s))
    }

    /// Switch output off for good. Later admissions do nothing.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Print the counters through the pipeline itself.
    pub fn report_stats(&self) {
        let snap = self.stats();
        let _ = self.add_msg(format_args!("tout: {}\n", snap));
    }

    /// Dispatch queue (read-only use: length, head peek).
    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    /// Arena contents, for diagnostics.
    pub fn arena_snapshot(&self) -> Vec<u8> {
        self.arena().as_bytes().to_vec()
    }

    /// Append the pause sentinel behind everything queued so far.
    ///
    /// Taken under the producer mutex so it never lands between the write
    /// and the enqueue of another producer's frame.
    pub(crate) fn request_pause(&self) {
        let _producer = self.producer();
        self.queue.push_blocking(Entry::Pause);
    }

    /// Render and transmit the next queued frame, waiting for one if needed.
    ///
    /// `render` must hold `max_row_len + 1` bytes.
    pub fn drain_next<T: SerialTx>(&self, tx: &mut T, render: &mut [u8]) -> DrainStep {
        let at = match self.queue.peek_blocking() {
            Entry::Pause => {
                self.queue.pop();
                return DrainStep::Paused;
            }
            Entry::Frame(at) => at,
        };

        let len = self.arena().copy_payload(at, render);
        let len = render_frame(render, len);

        // Frame copied: its span is free for producers from here on.
        self.queue.pop();

        match tx.send(&render[..len]) {
            Ok(()) => {
                self.stats.inc_printed();
                DrainStep::Sent
            }
            Err(_) => {
                self.stats.inc_send_errors();
                DrainStep::SendFailed
            }
        }
    }

    /// Allocate a render buffer sized for this pipeline.
    pub fn render_buffer(&self) -> Box<[u8]> {
        vec![0u8; self.config.max_row_len + 1].into_boxed_slice()
    }
}

/// Output drain task body. Runs forever.
///
/// Parks on `gate` whenever it consumes the pause sentinel.
pub fn run_drain<T: SerialTx>(out: &TermOut, tx: &mut T, gate: &TaskGate) -> ! {
    let mut render = out.render_buffer();
    loop {
        if out.drain_next(tx, &mut render) == DrainStep::Paused {
            gate.park();
        }
    }
}

/// `fmt::Write` adapter that queues one message per completed row.
///
/// Text is collected until `\n` (or until a row is full) so multi-part
/// `write!` calls do not turn into one frame per fragment.
pub struct TermWriter<'a> {
    out: &'a TermOut,
    row: String,
}

impl<'a> TermWriter<'a> {
    pub fn new(out: &'a TermOut) -> Self {
        Self {
            out,
            row: String::with_capacity(out.config.max_row_len),
        }
    }

    /// Queue whatever is pending, even without a newline.
    pub fn flush(&mut self) {
        if !self.row.is_empty() {
            let _ = self.out.add_str(&self.row);
            self.row.clear();
        }
    }
}

impl fmt::Write for TermWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.row.push(c);
            if c == '\n' || self.row.len() >= self.out.config.max_row_len {
                self.flush();
            }
        }
        Ok(())
    }
}

impl Drop for TermWriter<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Queue a formatted message on a [`TermOut`].
///
/// # Example
///
/// ```ignore
/// tout!(out, "adc: ch{} = {}\n", ch, value);
/// ```
#[macro_export]
macro_rules! tout {
    ($out:expr, $($arg:tt)*) => {{
        let _ = $out.add_msg(format_args!($($arg)*));
    }};
}
