//! Admission control for the frame store.
//!
//! A message is admitted only if its frame fits entirely in the free part
//! of the arena: the bytes from the end of the last admitted frame up to
//! the start of the oldest undrained frame (the dispatch queue head).
//!
//! ```text
//!        oldest undrained           last admitted
//!        ▼                          ▼
//!   ....[F0.....][F1.......][F2....][F3...]<---- free ----> ....
//!                                          ▲ candidate     ▲ wraps to F0
//! ```
//!
//! Free space is measured as the modular distance from the candidate start
//! forward to the oldest undrained start, so the wrapped and unwrapped
//! cases share one comparison.
//!
//! # Rules
//!
//! - Admission never blocks beyond the producer mutex and performs no I/O
//! - A rejected message writes nothing into undrained frames
//! - Messages are dropped under pressure, there is no retry

use core::fmt;

use thiserror::Error;

use crate::config::MAX_FRAME_PAYLOAD;
use crate::queue::{DispatchQueue, Entry};
use crate::store::{Arena, Cursor};

/// Why a message was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Output has been switched off.
    #[error("output disabled")]
    Disabled,
    /// Formatting produced no bytes.
    #[error("empty message")]
    Empty,
    /// A `Display` implementation reported an error.
    #[error("formatting failed")]
    Format,
    /// The frame would overwrite the oldest undrained frame.
    #[error("frame overlaps undrained data")]
    Overlap,
    /// The consumer is about to pause; new frames are ignored meanwhile.
    #[error("output pausing")]
    Paused,
    /// Dispatch queue has no free slot.
    #[error("dispatch queue full")]
    QueueFull,
    /// Payload cannot be described by a one-byte length.
    #[error("row too long for a frame")]
    Oversize,
}

/// Bounded formatter that remembers how much it had to cut.
struct ScratchWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    /// Length the output would have had without truncation.
    wanted: usize,
}

impl fmt::Write for ScratchWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        self.wanted += bytes.len();
        Ok(())
    }
}

/// Stack buffer large enough for any valid row.
pub type RowBuf = [u8; MAX_FRAME_PAYLOAD];

/// Format `args` into `buf`, which is exactly `max_row_len` bytes.
///
/// Over-long output is cut to `buf.len()` and its final byte is forced to
/// `\n` so the row still ends when rendered. Runs without any pipeline
/// lock: `Display` code may itself log.
pub fn format_row(args: fmt::Arguments<'_>, buf: &mut [u8]) -> Result<usize, Rejection> {
    let mut writer = ScratchWriter {
        buf: &mut *buf,
        pos: 0,
        wanted: 0,
    };
    fmt::write(&mut writer, args).map_err(|_| Rejection::Format)?;

    let (len, truncated) = (writer.pos, writer.wanted > writer.pos);
    if len == 0 {
        return Err(Rejection::Empty);
    }
    if truncated {
        buf[len - 1] = b'\n';
    }
    Ok(len)
}

/// Producer-side state. Owned by whoever holds the producer mutex.
#[derive(Debug, Default)]
pub struct Admitter {
    /// Start of the last frame that made it into the queue.
    last: Option<Cursor>,
}

impl Admitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of the last queued frame.
    #[inline]
    pub fn last_frame(&self) -> Option<Cursor> {
        self.last
    }

    /// Decide where a frame with `payload_len` bytes of payload goes.
    ///
    /// `head` is the dispatch queue head at decision time.
    pub fn place(
        &self,
        arena: &Arena,
        payload_len: usize,
        head: Option<Entry>,
    ) -> Result<Cursor, Rejection> {
        let candidate = match self.last {
            Some(last) => arena.frame_end(last),
            None => Cursor::START,
        };

        match head {
            None => Ok(candidate),
            Some(Entry::Pause) => Err(Rejection::Paused),
            Some(Entry::Frame(oldest)) => {
                // Equal cursors with a non-empty queue mean the arena is full.
                let free = arena.distance(candidate, oldest);
                if payload_len + 1 <= free {
                    Ok(candidate)
                } else {
                    Err(Rejection::Overlap)
                }
            }
        }
    }

    /// Place, write and enqueue one formatted row.
    ///
    /// The caller holds the producer mutex and exclusive access to `arena`.
    pub fn admit(
        &mut self,
        payload: &[u8],
        arena: &mut Arena,
        queue: &DispatchQueue,
    ) -> Result<Cursor, Rejection> {
        let at = self.place(arena, payload.len(), queue.peek())?;

        arena
            .write_frame(at, payload)
            .map_err(|_| Rejection::Oversize)?;

        // On a full queue the bytes stay behind unreferenced; the next
        // admission starts at the same place and overwrites them.
        queue
            .try_push(Entry::Frame(at))
            .map_err(|_| Rejection::QueueFull)?;
        self.last = Some(at);
        Ok(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl fmt::Display for Failing {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    fn format(args: fmt::Arguments<'_>, row: usize) -> Result<Vec<u8>, Rejection> {
        let mut buf = [0u8; MAX_FRAME_PAYLOAD];
        let len = format_row(args, &mut buf[..row])?;
        Ok(buf[..len].to_vec())
    }

    #[test]
    fn test_format_fits() {
        assert_eq!(format(format_args!("x={}\n", 42), 16).unwrap(), b"x=42\n");
    }

    #[test]
    fn test_format_truncates_with_newline() {
        let out = format(format_args!("0123456789abc"), 8).unwrap();
        assert_eq!(out, b"0123456\n");
    }

    #[test]
    fn test_format_exact_length_untouched() {
        let out = format(format_args!("01234567"), 8).unwrap();
        assert_eq!(out, b"01234567");
    }

    #[test]
    fn test_format_empty_and_error() {
        assert_eq!(format(format_args!(""), 8), Err(Rejection::Empty));
        assert_eq!(format(format_args!("{}", Failing), 8), Err(Rejection::Format));
    }

    #[test]
    fn test_first_frame_at_start() {
        let arena = Arena::new(32);
        let adm = Admitter::new();
        assert_eq!(adm.place(&arena, 4, None), Ok(Cursor::START));
    }

    #[test]
    fn test_place_rejects_when_pausing() {
        let arena = Arena::new(32);
        let adm = Admitter::new();
        assert_eq!(
            adm.place(&arena, 4, Some(Entry::Pause)),
            Err(Rejection::Paused)
        );
    }

    #[test]
    fn test_place_forward_overlap() {
        // last < oldest: candidate runs forward into the oldest frame
        let mut arena = Arena::new(32);
        let oldest = arena.cursor(20);
        let last = arena.cursor(10);
        arena.write_frame(last, b"abcd").unwrap(); // ends at 15
        let mut adm = Admitter::new();
        adm.last = Some(last);

        // 15..20 is free: 4 bytes of payload + length byte fit exactly
        assert_eq!(
            adm.place(&arena, 4, Some(Entry::Frame(oldest))),
            Ok(arena.cursor(15))
        );
        assert_eq!(
            adm.place(&arena, 5, Some(Entry::Frame(oldest))),
            Err(Rejection::Overlap)
        );
    }

    #[test]
    fn test_place_wrapped_tail_overlap() {
        // last > oldest, candidate wraps past the arena end
        let mut arena = Arena::new(32);
        let oldest = arena.cursor(4);
        let last = arena.cursor(24);
        arena.write_frame(last, b"abcde").unwrap(); // ends at 30
        let mut adm = Admitter::new();
        adm.last = Some(last);

        // 30,31,0,1,2,3 free: six bytes
        assert!(adm.place(&arena, 5, Some(Entry::Frame(oldest))).is_ok());
        assert_eq!(
            adm.place(&arena, 6, Some(Entry::Frame(oldest))),
            Err(Rejection::Overlap)
        );
    }

    #[test]
    fn test_place_full_arena() {
        let mut arena = Arena::new(16);
        let first = Cursor::START;
        arena.write_frame(first, b"0123456").unwrap(); // 0..8
        let second = arena.cursor(8);
        arena.write_frame(second, b"abcdefg").unwrap(); // 8..16 -> ends at 0
        let mut adm = Admitter::new();
        adm.last = Some(second);

        assert_eq!(
            adm.place(&arena, 1, Some(Entry::Frame(first))),
            Err(Rejection::Overlap)
        );
    }

    #[test]
    fn test_admit_queue_full_keeps_last() {
        let mut arena = Arena::new(64);
        let queue = DispatchQueue::new(1);
        let mut adm = Admitter::new();

        let first = adm
            .admit(b"one\n", &mut arena, &queue)
            .unwrap();
        assert_eq!(adm.last_frame(), Some(first));

        // Head is `first`; space is free but the queue has no slot
        assert_eq!(
            adm.admit(b"two\n", &mut arena, &queue),
            Err(Rejection::QueueFull)
        );
        assert_eq!(adm.last_frame(), Some(first));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_admit_rejects_oversize_payload() {
        let mut arena = Arena::new(1024);
        let queue = DispatchQueue::new(4);
        let mut adm = Admitter::new();
        let before = arena.as_bytes().to_vec();

        assert_eq!(
            adm.admit(&[b'x'; 300], &mut arena, &queue),
            Err(Rejection::Oversize)
        );
        assert_eq!(arena.as_bytes(), &before[..]);
        assert!(queue.is_empty());
        assert_eq!(adm.last_frame(), None);
    }
}
