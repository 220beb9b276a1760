//! Reusable byte accumulator for rendering one log line

/// Append-only byte buffer, reset between events
#[derive(Debug, Default)]
pub struct RenderBuffer {
    buf: Vec<u8>,
}

impl RenderBuffer {
    /// Create an empty buffer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn append_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    /// Append `n` in decimal, left-padded with zeros to `min_width` digits
    ///
    /// A `min_width` of zero means no padding. The sign of a negative number
    /// is not counted towards the width.
    pub fn append_int(&mut self, n: i64, min_width: usize) {
        if n < 0 {
            self.buf.push(b'-');
        }
        let mut digits = [0u8; 20];
        let mut value = n.unsigned_abs();
        let mut i = digits.len();
        loop {
            i -= 1;
            digits[i] = b'0' + (value % 10) as u8;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        let written = digits.len() - i;
        for _ in written..min_width {
            self.buf.push(b'0');
        }
        self.buf.extend_from_slice(&digits[i..]);
    }

    /// Truncate to empty, keeping the allocation
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Current contents; invalidated by the next [`RenderBuffer::reset`]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
