//! ## netcons-core::ring
//! **Fixed-capacity console byte ring**
//!
//! Producers append at `write_cursor`, the worker drains from `read_cursor`.
//! Both cursors are 64-bit counters that only ever grow; the physical slot is
//! `cursor % capacity`. Writes are never checked against the read cursor, so a
//! producer that outruns the worker by more than `capacity` bytes silently
//! overwrites the oldest unconsumed bytes.
//!
//! The ring carries no synchronization of its own. It is attached to the
//! mailbox and every access goes through the mailbox lock.

use bytes::Bytes;

use crate::error::RingError;

/// Default ring capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 16384;

/// Largest chunk the worker drains per flush event.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug)]
pub struct RingBuffer {
    data: Box<[u8]>,
    write_cursor: u64,
    read_cursor: u64,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        Ok(Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            write_cursor: 0,
            read_cursor: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn write_cursor(&self) -> u64 {
        self.write_cursor
    }

    #[inline]
    pub fn read_cursor(&self) -> u64 {
        self.read_cursor
    }

    /// Bytes written but not yet drained. May exceed `capacity` after an overrun.
    #[inline]
    pub fn pending(&self) -> u64 {
        self.write_cursor - self.read_cursor
    }

    /// True when unconsumed bytes have been overwritten by newer writes.
    #[inline]
    pub fn is_overrun(&self) -> bool {
        self.pending() > self.capacity() as u64
    }

    /// Appends one byte at the write cursor.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        let idx = self.slot(self.write_cursor);
        self.data[idx] = byte;
        self.write_cursor += 1;
    }

    /// Removes up to `max_len` of the oldest pending bytes.
    ///
    /// The length is additionally clamped to the ring capacity. The copy is a
    /// raw byte copy: interior zero bytes are part of the payload.
    pub fn drain_chunk(&mut self, max_len: usize) -> Bytes {
        let limit = max_len.min(self.capacity()) as u64;
        let len = self.pending().min(limit) as usize;
        if len == 0 {
            return Bytes::new();
        }

        let start = self.slot(self.read_cursor);
        let first = len.min(self.capacity() - start);
        let mut chunk = Vec::with_capacity(len);
        chunk.extend_from_slice(&self.data[start..start + first]);
        chunk.extend_from_slice(&self.data[..len - first]);

        self.read_cursor += len as u64;
        Bytes::from(chunk)
    }

    #[inline]
    fn slot(&self, cursor: u64) -> usize {
        (cursor % self.capacity() as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled(capacity: usize, bytes: &[u8]) -> RingBuffer {
        let mut ring = RingBuffer::new(capacity).unwrap();
        for &b in bytes {
            ring.write_byte(b);
        }
        ring
    }

    #[test]
    fn rejects_zero_capacity() {
        assert_eq!(RingBuffer::new(0).unwrap_err(), RingError::ZeroCapacity);
    }

    #[test]
    fn empty_ring_drains_nothing() {
        let mut ring = RingBuffer::new(16).unwrap();
        assert!(ring.drain_chunk(DEFAULT_CHUNK_SIZE).is_empty());
        assert_eq!(ring.read_cursor(), 0);
    }

    #[test]
    fn drain_clamps_to_max_len() {
        let mut ring = filled(16, b"abcdef");
        assert_eq!(&ring.drain_chunk(4)[..], b"abcd");
        assert_eq!(ring.read_cursor(), 4);
        assert_eq!(&ring.drain_chunk(4)[..], b"ef");
        assert!(ring.drain_chunk(4).is_empty());
    }

    #[test]
    fn keeps_interior_zero_bytes() {
        let mut ring = filled(16, b"a\0b\0c");
        assert_eq!(&ring.drain_chunk(16)[..], b"a\0b\0c");
    }

    #[test]
    fn drains_across_wrap_point() {
        let mut ring = filled(8, b"012345");
        assert_eq!(&ring.drain_chunk(6)[..], b"012345");
        for &b in b"abcdef" {
            ring.write_byte(b);
        }
        assert_eq!(&ring.drain_chunk(8)[..], b"abcdef");
        assert_eq!(ring.write_cursor(), 12);
        assert_eq!(ring.read_cursor(), 12);
    }

    #[test]
    fn overrun_is_lossy_but_counted() {
        let capacity = DEFAULT_CAPACITY;
        let total = capacity + 10;
        let mut ring = RingBuffer::new(capacity).unwrap();
        for i in 0..total {
            ring.write_byte(i as u8);
        }
        assert!(ring.is_overrun());

        let mut drained = 0;
        loop {
            let chunk = ring.drain_chunk(DEFAULT_CHUNK_SIZE);
            if chunk.is_empty() {
                break;
            }
            assert!(chunk.len() <= DEFAULT_CHUNK_SIZE);
            drained += chunk.len();
        }
        assert_eq!(drained, total);
        assert_eq!(ring.pending(), 0);
    }

    #[test]
    fn interleaved_drains_lose_nothing() {
        let capacity = DEFAULT_CAPACITY;
        let total = capacity + 10;
        let mut ring = RingBuffer::new(capacity).unwrap();
        let mut out = Vec::new();
        for i in 0..total {
            ring.write_byte((i % 251) as u8);
            if i % 1000 == 999 {
                out.extend_from_slice(&ring.drain_chunk(DEFAULT_CHUNK_SIZE));
            }
        }
        while ring.pending() > 0 {
            out.extend_from_slice(&ring.drain_chunk(DEFAULT_CHUNK_SIZE));
        }
        let expected: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        assert_eq!(out, expected);
    }

    proptest! {
        #[test]
        fn drain_returns_oldest_pending_bytes(
            bytes in proptest::collection::vec(any::<u8>(), 0..512),
            max_len in 0usize..600,
        ) {
            let mut ring = filled(512, &bytes);
            let before = ring.read_cursor();
            let chunk = ring.drain_chunk(max_len);
            let expected_len = bytes.len().min(max_len);
            prop_assert_eq!(&chunk[..], &bytes[..expected_len]);
            prop_assert_eq!(ring.read_cursor() - before, expected_len as u64);
        }
    }
}
