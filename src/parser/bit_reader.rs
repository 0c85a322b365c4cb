/// Reads LSB-first codes out of the concatenated image data sub-blocks.
pub struct BitReader<'a> {
    buf: &'a [u8],
    // next byte to pull into the accumulator
    position: usize,
    bits: u32,
    bit_count: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            position: 0,
            bits: 0,
            bit_count: 0,
        }
    }

    /// Returns the next `count` bits, or `None` once fewer than `count` remain.
    /// `count` never exceeds the 12-bit LZW code width.
    pub fn next(&mut self, count: u32) -> Option<u16> {
        debug_assert!(count <= 16);

        while self.bit_count < count {
            let byte = *self.buf.get(self.position)?;
            self.bits |= u32::from(byte) << self.bit_count;
            self.bit_count += 8;
            self.position += 1;
        }

        let value = self.bits & ((1 << count) - 1);
        self.bits >>= count;
        self.bit_count -= count;

        Some(value as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::BitReader;

    #[test]
    fn reads_three_bit_codes() {
        let buffer = &[
            0b10000100,
            0b10001111,
            0b10101001,
            0b11001011,
            0b11101101,
            0b00001111,
            0b10100011
        ];
        let mut reader = BitReader::new(buffer);
        assert_eq!(reader.next(3), Some(0b00000100));
        assert_eq!(reader.next(3), Some(0b00000000));
        assert_eq!(reader.next(3), Some(0b00000110));
        assert_eq!(reader.next(3), Some(0b00000111));
        assert_eq!(reader.next(3), Some(0b00000000));
        assert_eq!(reader.next(3), Some(0b00000011));
        assert_eq!(reader.next(3), Some(0b00000010));
        assert_eq!(reader.next(3), Some(0b00000101));
    }

    #[test]
    fn codes_span_byte_boundaries() {
        let mut reader = BitReader::new(&[0xff, 0x0f, 0xab]);
        assert_eq!(reader.next(12), Some(0x0fff));
        assert_eq!(reader.next(8), Some(0xb0));
        assert_eq!(reader.next(4), Some(0x0a));
        assert_eq!(reader.next(1), None);
    }

    #[test]
    fn stops_when_bits_run_out() {
        let mut reader = BitReader::new(&[0x01]);
        assert_eq!(reader.next(5), Some(1));
        assert_eq!(reader.next(5), None);
    }
}
