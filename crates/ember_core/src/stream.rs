//! # Binary Streams
//!
//! Append-only byte buffers with typed cursors, used to carry the frame
//! command and constant protocols from the simulation thread to the render
//! thread.
//!
//! ## Design
//!
//! - Little-endian on the wire, `Pod` types copied byte-for-byte
//! - Variable-length payloads are length-prefixed (`[len:4][bytes:len]`),
//!   so every record is self-delimiting
//! - The writer reserves its capacity once and keeps it across `clear()`;
//!   steady-state frames perform zero allocations
//! - The reader borrows: bulk payloads decode as sub-slices, never copies
//!
//! Reading past the end of a stream is a protocol violation between the
//! two threads and aborts with a panic; there is no recovery path.

use bytemuck::{bytes_of, Pod};

/// Stream writer - appends typed values to a growable byte buffer.
///
/// This struct is designed to be reused frame after frame: `clear()`
/// resets the cursor but keeps the allocation.
#[derive(Default)]
pub struct StreamWriter {
    buffer: Vec<u8>,
}

impl StreamWriter {
    /// Creates a writer with `capacity` bytes reserved up front.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Resets the writer for reuse. The allocation is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a slice of the written data.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a u16 in little-endian format.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u32 in little-endian format.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u64 in little-endian format.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a f32 in little-endian format.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a Pod type directly.
    #[inline]
    pub fn write_pod<T: Pod>(&mut self, value: &T) {
        self.buffer.extend_from_slice(bytes_of(value));
    }

    /// Writes a length-prefixed payload: `[len:4][bytes:len]`.
    ///
    /// The bytes are copied into the stream; the caller keeps no lifetime
    /// obligation once this returns.
    ///
    /// # Panics
    ///
    /// Panics if `payload` exceeds `u32::MAX` bytes.
    pub fn write_blob(&mut self, payload: &[u8]) {
        let len = u32::try_from(payload.len()).expect("Blob exceeds the 32-bit length prefix");
        self.write_u32(len);
        self.buffer.extend_from_slice(payload);
    }
}

/// Stream reader - advances a cursor over a borrowed byte buffer.
///
/// Values must be read back in exactly the order and with exactly the
/// types they were written; the length prefixes make most mismatches a
/// detectable fault (a panic), the rest are garbage-in-garbage-out and
/// documented as a contract violation.
pub struct StreamReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> StreamReader<'a> {
    /// Creates a reader over `buffer` with the cursor at the start.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, position: 0 }
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Advances the cursor over `size` bytes and returns them.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `size` bytes remain - the streams are written
    /// and read by the same binary, so this can only mean the two threads
    /// disagree on the protocol.
    #[inline]
    fn take(&mut self, size: usize) -> &'a [u8] {
        assert!(
            self.remaining() >= size,
            "Read past the end of a stream (wanted {size} bytes, {} remaining)",
            self.remaining()
        );
        let slice = &self.buffer[self.position..self.position + size];
        self.position += size;
        slice
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    /// Reads a u16 in little-endian format.
    #[inline]
    pub fn read_u16(&mut self) -> u16 {
        let bytes = self.take(2);
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    /// Reads a u32 in little-endian format.
    #[inline]
    pub fn read_u32(&mut self) -> u32 {
        let bytes = self.take(4);
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a u64 in little-endian format.
    #[inline]
    pub fn read_u64(&mut self) -> u64 {
        let bytes = self.take(8);
        u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ])
    }

    /// Reads a f32 in little-endian format.
    #[inline]
    pub fn read_f32(&mut self) -> f32 {
        f32::from_bits(self.read_u32())
    }

    /// Reads a Pod type directly.
    #[inline]
    pub fn read_pod<T: Pod>(&mut self) -> T {
        let slice = self.take(std::mem::size_of::<T>());
        bytemuck::pod_read_unaligned(slice)
    }

    /// Reads a length-prefixed payload written by
    /// [`StreamWriter::write_blob`], without copying.
    #[inline]
    pub fn read_blob(&mut self) -> &'a [u8] {
        let len = self.read_u32() as usize;
        self.take(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct TestRecord {
        a: u32,
        b: f32,
    }

    #[test]
    fn test_scalar_roundtrip() {
        let mut w = StreamWriter::with_capacity(64);
        w.write_u8(7);
        w.write_u16(1000);
        w.write_u32(123_456);
        w.write_u64(u64::MAX - 1);
        w.write_f32(2.5);

        let mut r = StreamReader::new(w.as_slice());
        assert_eq!(r.read_u8(), 7);
        assert_eq!(r.read_u16(), 1000);
        assert_eq!(r.read_u32(), 123_456);
        assert_eq!(r.read_u64(), u64::MAX - 1);
        assert!((r.read_f32() - 2.5).abs() < f32::EPSILON);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_pod_roundtrip() {
        let record = TestRecord { a: 42, b: -1.0 };

        let mut w = StreamWriter::with_capacity(16);
        w.write_pod(&record);

        let mut r = StreamReader::new(w.as_slice());
        assert_eq!(r.read_pod::<TestRecord>(), record);
    }

    #[test]
    fn test_blob_is_length_prefixed_and_zero_copy() {
        let payload = [1u8, 2, 3, 4, 5];

        let mut w = StreamWriter::with_capacity(16);
        w.write_blob(&payload);
        w.write_u8(0xAA); // Trailing data must survive the blob read

        let mut r = StreamReader::new(w.as_slice());
        assert_eq!(r.read_blob(), &payload);
        assert_eq!(r.read_u8(), 0xAA);
    }

    #[test]
    fn test_empty_blob() {
        let mut w = StreamWriter::with_capacity(8);
        w.write_blob(&[]);

        let mut r = StreamReader::new(w.as_slice());
        assert!(r.read_blob().is_empty());
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut w = StreamWriter::with_capacity(4);
        w.write_u64(9);
        let cap_before = w.buffer.capacity();

        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.len(), 0);
        assert_eq!(w.buffer.capacity(), cap_before);
    }

    #[test]
    fn test_cleared_writer_equals_fresh_writer() {
        let mut used = StreamWriter::with_capacity(32);
        used.write_u32(1);
        used.clear();

        let fresh = StreamWriter::with_capacity(32);
        assert_eq!(used.as_slice(), fresh.as_slice());
    }

    #[test]
    #[should_panic(expected = "Read past the end of a stream")]
    fn test_read_past_end_panics() {
        let mut w = StreamWriter::with_capacity(4);
        w.write_u16(3);

        let mut r = StreamReader::new(w.as_slice());
        let _ = r.read_u32(); // Only 2 bytes available
    }

    #[test]
    #[should_panic(expected = "Read past the end of a stream")]
    fn test_read_from_empty_panics() {
        let mut r = StreamReader::new(&[]);
        let _ = r.read_u8();
    }
}
