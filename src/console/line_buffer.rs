//! Line buffer for console input

/// Fixed-capacity input line.
///
/// Only printable 7-bit ASCII is ever stored, so the contents are always
/// valid UTF-8.
pub struct LineBuffer {
    buf: Box<[u8]>,
    pos: usize,
}

impl LineBuffer {
    /// Create empty buffer holding up to `capacity` characters
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
        }
    }

    /// Append a character. Returns `false` if the buffer is full.
    pub fn push(&mut self, c: u8) -> bool {
        if self.pos < self.buf.len() {
            self.buf[self.pos] = c;
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Remove last character
    pub fn backspace(&mut self) -> bool {
        if self.pos > 0 {
            self.pos -= 1;
            self.buf[self.pos] = 0;
            true
        } else {
            false
        }
    }

    /// Zero the contents and rewind
    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.pos = 0;
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.pos]).unwrap_or("")
    }

    /// Fill position
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Whole backing store, including bytes past the fill position
    pub fn raw(&self) -> &[u8] {
        &self.buf
    }
}
