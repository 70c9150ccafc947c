use byteorder::{ByteOrder, LittleEndian};

/// A fixed-size little-endian binary layout, with no padding.
///
/// `Default` must produce the all-zero record: unwritten store slots read
/// back as zero-filled bytes and must decode to a meaningful "absent" value.
pub trait Record: Default + Copy {
    /// Encoded size in bytes. `encode`/`decode` buffers are exactly this long.
    const SIZE: usize;

    fn encode(&self, buf: &mut [u8]);

    fn decode(buf: &[u8]) -> Self;
}

/// Location of a variable-length payload: `len` units starting at byte `at`.
///
/// Doubles as the [`DynamicRecordStore`](crate::DynamicRecordStore) side-index
/// entry and as a standalone lookup value. `len == 0` is the sentinel for
/// "absent" and must short-circuit lookups without touching the payload file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub at: u32,
    pub len: u32,
}

impl Record for Offset {
    const SIZE: usize = 8;

    fn encode(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..4], self.at);
        LittleEndian::write_u32(&mut buf[4..8], self.len);
    }

    fn decode(buf: &[u8]) -> Self {
        Self {
            at: LittleEndian::read_u32(&buf[0..4]),
            len: LittleEndian::read_u32(&buf[4..8]),
        }
    }
}

// Opaque byte payloads (e.g. serialized hover blobs) reuse the dynamic store
// machinery as lists of single-byte records.
impl Record for u8 {
    const SIZE: usize = 1;

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = *self;
    }

    fn decode(buf: &[u8]) -> Self {
        buf[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_layout_is_little_endian() {
        let mut buf = [0u8; Offset::SIZE];
        Offset { at: 1, len: 2 }.encode(&mut buf);
        assert_eq!(buf, [0x1, 0x0, 0x0, 0x0, 0x2, 0x0, 0x0, 0x0]);
        assert_eq!(Offset::decode(&buf), Offset { at: 1, len: 2 });
    }

    #[test]
    fn zero_bytes_decode_to_default() {
        assert_eq!(Offset::decode(&[0u8; Offset::SIZE]), Offset::default());
    }
}
