//! Bit-level wire stream for delta payloads.
//!
//! Change flags cost one bit each, so the stream packs bits tightly rather
//! than rounding every field up to a byte. Values are written LSB-first
//! within each byte; the writer and reader agree on that order and nothing
//! else ever parses these buffers.

/// Decode failure on the receiving side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BitstreamError {
    #[error("stream ended {missing} bit(s) early")]
    UnexpectedEnd { missing: usize },
}

/// Append-only bit stream writer.
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn write_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << offset;
        }
        self.bit_len += 1;
    }

    /// Writes the low `count` bits of `value`, LSB first. Used for small
    /// enums and counters that never need a full integer width.
    pub fn write_bits(&mut self, value: u32, count: u32) {
        debug_assert!(count <= 32);
        for shift in 0..count {
            self.write_bit(value >> shift & 1 == 1);
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bits(value, 32);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_u32(value as u32);
        self.write_u32((value >> 32) as u32);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// The packed buffer. Trailing bits of the last byte are zero.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Cursor over a buffer produced by [`BitWriter`].
pub struct BitReader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Bits left before the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.cursor
    }

    pub fn read_bit(&mut self) -> Result<bool, BitstreamError> {
        let Some(byte) = self.bytes.get(self.cursor / 8) else {
            return Err(BitstreamError::UnexpectedEnd { missing: 1 });
        };
        let bit = byte >> (self.cursor % 8) & 1 == 1;
        self.cursor += 1;
        Ok(bit)
    }

    pub fn read_bits(&mut self, count: u32) -> Result<u32, BitstreamError> {
        debug_assert!(count <= 32);
        if self.remaining() < count as usize {
            return Err(BitstreamError::UnexpectedEnd {
                missing: count as usize - self.remaining(),
            });
        }
        let mut value = 0u32;
        for shift in 0..count {
            if self.read_bit()? {
                value |= 1 << shift;
            }
        }
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32, BitstreamError> {
        self.read_bits(32)
    }

    pub fn read_u64(&mut self) -> Result<u64, BitstreamError> {
        let low = self.read_u32()? as u64;
        let high = self.read_u32()? as u64;
        Ok(low | high << 32)
    }

    pub fn read_f32(&mut self) -> Result<f32, BitstreamError> {
        Ok(f32::from_bits(self.read_u32()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_fields_survive_the_round_trip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b101, 3);
        writer.write_f32(-7.25);
        writer.write_bit(false);
        writer.write_u32(0xDEAD_BEEF);
        let bit_len = writer.bit_len();
        let bytes = writer.finish();
        assert_eq!(bit_len, 1 + 3 + 32 + 1 + 32);

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_f32().unwrap(), -7.25);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn truncated_stream_reports_missing_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b11, 2);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        // Only the zero padding of the final byte remains.
        assert_eq!(reader.remaining(), 6);
        assert_eq!(
            reader.read_u32(),
            Err(BitstreamError::UnexpectedEnd { missing: 26 })
        );
    }
}
