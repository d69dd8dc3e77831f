//! Part buffer
//!
//! Accumulates encoded batches until enough bytes exist for one upload part.

use bytes::{Bytes, BytesMut};

/// Byte accumulator for one upload part.
///
/// The buffer reports itself full once it holds at least `target` bytes, but
/// a single `append` is always written whole: a serialized batch is never
/// split across two parts, so a part may run somewhat past the target. The
/// backing storage grows to absorb that overflow instead of relying on a
/// fixed-size allocation.
#[derive(Debug)]
pub struct PartBuffer {
    buf: BytesMut,
    target: usize,
}

impl PartBuffer {
    /// Create a buffer with the given target part size in bytes
    pub fn new(target: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(target),
            target,
        }
    }

    /// Target part size in bytes
    pub fn target(&self) -> usize {
        self.target
    }

    /// Append an encoded batch in full. Returns `true` when the buffer now
    /// holds at least one part's worth of bytes.
    pub fn append(&mut self, bytes: &[u8]) -> bool {
        self.buf.extend_from_slice(bytes);
        self.is_full()
    }

    /// Whether the buffer holds at least `target` bytes
    pub fn is_full(&self) -> bool {
        self.buf.len() >= self.target
    }

    /// Bytes currently buffered
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the accumulated part and reset the buffer for reuse
    pub fn take(&mut self) -> Bytes {
        let part = self.buf.split().freeze();
        self.buf.reserve(self.target);
        part
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_full_below_target() {
        let mut buffer = PartBuffer::new(16);
        assert!(!buffer.append(&[0u8; 8]));
        assert!(!buffer.is_full());
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn test_full_at_target() {
        let mut buffer = PartBuffer::new(16);
        buffer.append(&[0u8; 8]);
        assert!(buffer.append(&[0u8; 8]));
        assert!(buffer.is_full());
    }

    #[test]
    fn test_single_append_may_overflow_target() {
        let mut buffer = PartBuffer::new(16);
        assert!(buffer.append(&[0u8; 40]));
        assert_eq!(buffer.len(), 40);
        assert_eq!(buffer.take().len(), 40);
    }

    #[test]
    fn test_take_resets_for_reuse() {
        let mut buffer = PartBuffer::new(8);
        buffer.append(b"0123456789");
        let part = buffer.take();
        assert_eq!(&part[..], b"0123456789");
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());

        buffer.append(b"abcdefgh");
        assert!(buffer.is_full());
        assert_eq!(&buffer.take()[..], b"abcdefgh");
    }

    #[test]
    fn test_take_empty_yields_empty_part() {
        let mut buffer = PartBuffer::new(8);
        assert!(buffer.take().is_empty());
    }
}
