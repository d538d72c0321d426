//! Interruptible receiver built on a polling byte source.
//!
//! Drivers that can only wait with a timeout (UART FIFO reads, host
//! channels) are wrapped here: the wrapper polls in short slices and
//! checks an interrupt flag between them, which gives the sleep protocol
//! its `Interrupted` outcome without touching the driver.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::task::{RecvOutcome, RxInterrupt, SerialRx};

/// Default polling slice.
pub const POLL_SLICE: Duration = Duration::from_millis(10);

/// Byte source that waits at most `wait` per call.
pub trait PollRead: Send {
    /// `None` if nothing arrived within `wait`.
    ///
    /// Returns `Some(RecvOutcome::Ready)` or `Some(RecvOutcome::Fault)`.
    fn poll_byte(&mut self, wait: Duration) -> Option<RecvOutcome>;
}

/// Shared interrupt request flag.
#[derive(Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending request.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl RxInterrupt for InterruptFlag {
    fn interrupt(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// [`SerialRx`] over a [`PollRead`] source.
pub struct InterruptibleRx<P> {
    source: P,
    flag: InterruptFlag,
    slice: Duration,
}

impl<P: PollRead> InterruptibleRx<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            flag: InterruptFlag::new(),
            slice: POLL_SLICE,
        }
    }

    /// Handle for the sleep protocol.
    pub fn interrupt_handle(&self) -> InterruptFlag {
        self.flag.clone()
    }
}

impl<P: PollRead> SerialRx for InterruptibleRx<P> {
    /// A finite `timeout` that expires reports `Fault`, like any
    /// non-zero receive status.
    fn recv(&mut self, timeout: Option<Duration>) -> RecvOutcome {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if self.flag.take() {
                return RecvOutcome::Interrupted;
            }
            if let Some(outcome) = self.source.poll_byte(self.slice) {
                return outcome;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return RecvOutcome::Fault;
            }
        }
    }
}
