//! Frame store: fixed byte arena holding length-prefixed message frames.
//!
//! # Layout
//!
//! ```text
//!   start                                      end (wraps to 0)
//!   ▼                                          ▼
//!   [ld .. d][ld .. d][ld .. d ....        ... d][d ...
//!    └ frame  └ frame  └ frame written across the end ┘
//! ```
//!
//! A frame is `[payload_len + 1][payload]`. Every byte position is taken
//! modulo the arena capacity, so a frame may start anywhere and continue
//! at index 0 once it runs past the end.

use thiserror::Error;

/// Payload longer than a frame or the arena can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("payload of {0} bytes does not fit a frame")]
pub struct Oversize(pub usize);

/// Position inside the arena, always `< capacity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor(usize);

impl Cursor {
    /// Arena start.
    pub const START: Cursor = Cursor(0);

    /// Raw byte index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Byte arena with modular cursor arithmetic.
pub struct Arena {
    bytes: Box<[u8]>,
}

impl Arena {
    /// Create a zero-filled arena.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 1, "arena needs room for a length byte and payload");
        Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Build a cursor from any index, wrapping it into range.
    #[inline]
    pub fn cursor(&self, index: usize) -> Cursor {
        Cursor(index % self.capacity())
    }

    /// Cursor `n` bytes past `at`.
    #[inline]
    pub fn advance(&self, at: Cursor, n: usize) -> Cursor {
        Cursor((at.0 + n % self.capacity()) % self.capacity())
    }

    /// Bytes from `from` forward to `to`, wrapping at the end.
    ///
    /// Equal cursors give 0.
    #[inline]
    pub fn distance(&self, from: Cursor, to: Cursor) -> usize {
        let cap = self.capacity();
        (to.0 + cap - from.0) % cap
    }

    /// Total length (length byte included) of the frame starting at `at`.
    #[inline]
    pub fn frame_len(&self, at: Cursor) -> usize {
        self.bytes[at.0] as usize
    }

    /// Cursor just past the frame starting at `at`.
    #[inline]
    pub fn frame_end(&self, at: Cursor) -> Cursor {
        self.advance(at, self.frame_len(at))
    }

    /// Write a frame at `at`, wrapping byte by byte.
    ///
    /// The caller guarantees the span is free. Nothing is written if the
    /// payload cannot be framed.
    pub fn write_frame(&mut self, at: Cursor, payload: &[u8]) -> Result<(), Oversize> {
        let len_byte = u8::try_from(payload.len() + 1).map_err(|_| Oversize(payload.len()))?;
        if payload.len() >= self.capacity() {
            return Err(Oversize(payload.len()));
        }

        self.bytes[at.0] = len_byte;
        let mut idx = self.advance(at, 1).0;
        for &b in payload {
            self.bytes[idx] = b;
            idx += 1;
            if idx == self.capacity() {
                idx = 0;
            }
        }
        Ok(())
    }

    /// Copy the payload of the frame at `at` into `out`.
    ///
    /// Returns the payload length. `out` must hold at least that many bytes.
    pub fn copy_payload(&self, at: Cursor, out: &mut [u8]) -> usize {
        let len = self.frame_len(at).saturating_sub(1);
        let first = self.advance(at, 1).0;

        // At most two contiguous runs: up to the end, then from the start.
        let head = len.min(self.capacity() - first);
        out[..head].copy_from_slice(&self.bytes[first..first + head]);
        out[head..len].copy_from_slice(&self.bytes[..len - head]);
        len
    }

    /// Raw arena contents (diagnostics and tests).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_arithmetic_wraps() {
        let arena = Arena::new(16);
        let c = arena.cursor(14);

        assert_eq!(arena.advance(c, 1).index(), 15);
        assert_eq!(arena.advance(c, 2).index(), 0);
        assert_eq!(arena.advance(c, 5).index(), 3);
        assert_eq!(arena.distance(c, arena.cursor(3)), 5);
        assert_eq!(arena.distance(arena.cursor(3), c), 11);
        assert_eq!(arena.distance(c, c), 0);
    }

    #[test]
    fn test_write_and_copy_contiguous() {
        let mut arena = Arena::new(32);
        arena.write_frame(Cursor::START, b"abc\n").unwrap();

        assert_eq!(arena.frame_len(Cursor::START), 5);
        assert_eq!(arena.frame_end(Cursor::START).index(), 5);

        let mut out = [0u8; 8];
        let n = arena.copy_payload(Cursor::START, &mut out);
        assert_eq!(&out[..n], b"abc\n");
    }

    #[test]
    fn test_write_wraps_past_end() {
        let mut arena = Arena::new(8);
        let at = arena.cursor(5);
        arena.write_frame(at, b"hello").unwrap();

        // Length byte at 5, payload at 6,7,0,1,2
        assert_eq!(arena.as_bytes()[5], 6);
        assert_eq!(&arena.as_bytes()[6..8], b"he");
        assert_eq!(&arena.as_bytes()[0..3], b"llo");
        assert_eq!(arena.frame_end(at).index(), 3);

        let mut out = [0u8; 8];
        let n = arena.copy_payload(at, &mut out);
        assert_eq!(&out[..n], b"hello");
    }

    #[test]
    fn test_length_byte_at_last_slot() {
        let mut arena = Arena::new(8);
        let at = arena.cursor(7);
        arena.write_frame(at, b"xy").unwrap();

        assert_eq!(arena.as_bytes()[7], 3);
        assert_eq!(&arena.as_bytes()[0..2], b"xy");

        let mut out = [0u8; 4];
        assert_eq!(arena.copy_payload(at, &mut out), 2);
        assert_eq!(&out[..2], b"xy");
    }

    #[test]
    fn test_oversize_payload_rejected_untouched() {
        let mut arena = Arena::new(1024);
        assert_eq!(arena.write_frame(Cursor::START, &[b'x'; 255]), Err(Oversize(255)));
        assert!(arena.as_bytes().iter().all(|&b| b == 0));

        let mut small = Arena::new(8);
        assert_eq!(small.write_frame(Cursor::START, b"01234567"), Err(Oversize(8)));
        assert!(small.write_frame(Cursor::START, b"0123456").is_ok());
    }
}
