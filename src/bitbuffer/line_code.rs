//! Line code decoding applied to rows of raw demodulated bits.
use super::BitBuffer;

impl BitBuffer {
    /// Decode NRZ-S (non-return-to-zero space) in place: an unchanged level is a 1,
    /// a transition is a 0. The level before the first bit is taken to be 0.
    pub fn nrzs_decode(&mut self) {
        for row in self.rows_mut() {
            let mut prev = 0;
            for i in 0..row.len() {
                let bit = row.bit(i);
                row.set_bit(i, u8::from(bit == prev));
                prev = bit;
            }
        }
    }

    /// Decode NRZ-M (non-return-to-zero mark) in place: a transition is a 1, an
    /// unchanged level is a 0. The level before the first bit is taken to be 0.
    pub fn nrzm_decode(&mut self) {
        for row in self.rows_mut() {
            let mut prev = 0;
            for i in 0..row.len() {
                let bit = row.bit(i);
                row.set_bit(i, u8::from(bit != prev));
                prev = bit;
            }
        }
    }

    fn decode_limit(&self, row: usize, start: usize, max: usize) -> usize {
        let len = self.bits_per_row(row);
        if max != 0 && len > start + max * 2 {
            start + max * 2
        } else {
            len
        }
    }

    /// Manchester decode (IEEE 802.3 convention, `10` is 0 and `01` is 1) `row`
    /// from bit `start`, appending at most `max` bits to `out` (0 for no limit).
    ///
    /// Decoding stops at the first symbol whose two halves are equal. Returns the
    /// input bit position reached, including that invalid symbol.
    ///
    /// # Panics
    /// If `row` is out of range.
    pub fn manchester_decode(
        &self,
        row: usize,
        start: usize,
        out: &mut BitBuffer,
        max: usize,
    ) -> usize {
        let bits = self.row(row);
        let len = self.decode_limit(row, start, max);
        let mut ipos = start;
        while ipos < len {
            let bit1 = bits.bit(ipos);
            let bit2 = bits.bit(ipos + 1);
            ipos += 2;
            if bit1 == bit2 {
                break;
            }
            out.add_bit(bit2);
        }
        ipos
    }

    /// Differential Manchester decode `row` from bit `start`, appending at most
    /// `max` bits to `out` (0 for no limit).
    ///
    /// Every symbol has a mid-bit transition; a transition at the following symbol
    /// boundary encodes a 0, no transition a 1. Returns the input bit position
    /// reached when a symbol without a mid-bit transition is found or the row ends.
    ///
    /// # Panics
    /// If `row` is out of range.
    pub fn differential_manchester_decode(
        &self,
        row: usize,
        start: usize,
        out: &mut BitBuffer,
        max: usize,
    ) -> usize {
        let bits = self.row(row);
        let len = self.decode_limit(row, start, max);
        let mut ipos = start;
        while ipos < len {
            let bit1 = bits.bit(ipos);
            let bit2 = bits.bit(ipos + 1);
            let bit3 = bits.bit(ipos + 2);
            ipos += 2;
            if bit1 == bit2 {
                break;
            }
            out.add_bit(u8::from(bit2 == bit3));
        }
        ipos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nrzs() {
        let mut bits = BitBuffer::from_rows([(&[0b1100_1000][..], 6)]);
        bits.nrzs_decode();
        assert_eq!(bits.row(0).as_bytes(), &[0b0101_0000]);
        assert_eq!(bits.bits_per_row(0), 6);
    }

    #[test]
    fn nrzm() {
        let mut bits = BitBuffer::from_rows([(&[0b1100_1000][..], 6)]);
        bits.nrzm_decode();
        assert_eq!(bits.row(0).as_bytes(), &[0b1010_1100]);
    }

    #[test]
    fn manchester_stops_on_invalid_symbol() {
        // 10 01 01 10 11
        let bits = BitBuffer::from_rows([(&[0x96, 0xc0][..], 10)]);
        let mut out = BitBuffer::new();
        let pos = bits.manchester_decode(0, 0, &mut out, 0);
        assert_eq!(pos, 10);
        assert_eq!(out.bits_per_row(0), 4);
        assert_eq!(out.row(0).as_bytes(), &[0b0110_0000]);
    }

    #[test]
    fn manchester_honors_max() {
        let bits = BitBuffer::from_rows([(&[0x96, 0xc0][..], 10)]);
        let mut out = BitBuffer::new();
        let pos = bits.manchester_decode(0, 0, &mut out, 2);
        assert_eq!(pos, 4);
        assert_eq!(out.bits_per_row(0), 2);
        assert_eq!(out.row(0).as_bytes(), &[0b0100_0000]);
    }

    #[test]
    fn manchester_from_offset() {
        // leading 0 then 01 10
        let bits = BitBuffer::from_rows([(&[0b0011_0000][..], 5)]);
        let mut out = BitBuffer::new();
        let pos = bits.manchester_decode(0, 1, &mut out, 0);
        assert_eq!(pos, 5);
        assert_eq!(out.row(0).as_bytes(), &[0b1000_0000]);
    }

    #[test]
    fn differential_manchester() {
        let bits = BitBuffer::from_rows([(&[0b1010_0111][..], 8)]);
        let mut out = BitBuffer::new();
        let pos = bits.differential_manchester_decode(0, 0, &mut out, 0);
        assert_eq!(pos, 8);
        assert_eq!(out.bits_per_row(0), 3);
        assert_eq!(out.row(0).as_bytes(), &[0b0110_0000]);
    }
}
