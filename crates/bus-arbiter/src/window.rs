use core::ops::Range;

/// Requested slice of a transfer buffer, as `buffer[start:end]`.
///
/// `end` may be negative to count from the tail of the buffer. The default
/// window (`start = 0`, `end = i32::MAX`) covers the whole buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    /// Index of the first byte to transfer.
    pub start: u32,
    /// Index one past the last byte to transfer; negative counts from the end.
    pub end: i32,
}

impl Window {
    /// The whole buffer.
    pub const ALL: Self = Self { start: 0, end: i32::MAX };

    pub const fn new(start: u32, end: i32) -> Self {
        Self { start, end }
    }

    /// From `start` to the end of the buffer.
    pub const fn starting_at(start: u32) -> Self {
        Self { start, end: i32::MAX }
    }

    /// From the beginning of the buffer up to `end`.
    pub const fn until(end: i32) -> Self {
        Self { start: 0, end }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::ALL
    }
}

/// Effective `(offset, length)` range of a buffer selected by a [`Window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferWindow {
    pub offset: usize,
    pub length: usize,
}

impl BufferWindow {
    /// Resolve `window` against a buffer of `len` bytes.
    ///
    /// Arithmetic is 32-bit and wrapping: a negative `end` is shifted by
    /// `len`, the length is `end - start` computed unsigned, an out-of-order
    /// pair yields an empty window and anything longer than the buffer is
    /// clamped to `len`. `start` itself is not checked against `len`.
    pub fn compute(len: usize, window: Window) -> Self {
        let buf_len = len as u32;

        let mut end = window.end;
        if end < 0 {
            end = end.wrapping_add(buf_len as i32);
        }
        let end = end as u32;
        let start = window.start;

        let mut length = end.wrapping_sub(start);
        if end < start {
            length = 0;
        } else if length > buf_len {
            length = buf_len;
        }

        Self { offset: start as usize, length: length as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// `[offset, offset + length)`, saturating on overflow.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset.saturating_add(self.length)
    }

    /// The windowed bytes of `buf`, clipped to the buffer's bounds.
    pub fn apply<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        let range = self.clip(buf.len());
        &buf[range]
    }

    /// Mutable counterpart of [`apply`](Self::apply).
    pub fn apply_mut<'a>(&self, buf: &'a mut [u8]) -> &'a mut [u8] {
        let range = self.clip(buf.len());
        &mut buf[range]
    }

    fn clip(&self, len: usize) -> Range<usize> {
        let range = self.range();
        let end = range.end.min(len);
        range.start.min(end)..end
    }
}
