/// A single row of demodulated bits, packed MSB-first into bytes.
///
/// Bits past [BitRow::len] in the final storage byte are always zero, so two
/// rows compare equal exactly when they hold the same bit sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitRow {
    bytes: Vec<u8>,
    len: usize,
}

impl BitRow {
    /// Maximum number of bits a row can hold.
    pub const MAX_BITS: usize = 1024;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a row holding the first `num_bits` bits of `bytes`.
    ///
    /// `num_bits` is clamped to both the available bits and [BitRow::MAX_BITS].
    #[must_use]
    pub fn from_bytes(bytes: &[u8], num_bits: usize) -> Self {
        let len = num_bits.min(bytes.len() * 8).min(Self::MAX_BITS);
        let mut bytes = bytes[..len.div_ceil(8)].to_vec();
        if len % 8 != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xff << (8 - len % 8);
            }
        }
        BitRow { bytes, len }
    }

    /// Number of valid bits in this row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= Self::MAX_BITS
    }

    /// Packed storage; the final byte is zero padded.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bit at `idx`, or 0 past the end of the row.
    #[must_use]
    pub fn bit(&self, idx: usize) -> u8 {
        if idx >= self.len {
            return 0;
        }
        (self.bytes[idx >> 3] >> (7 - (idx & 7))) & 1
    }

    /// Byte starting at the (possibly unaligned) bit position `idx`. Bits past the
    /// end of the row read as zero.
    #[must_use]
    pub fn byte_at(&self, idx: usize) -> u8 {
        let shift = idx & 7;
        let hi = self.stored(idx >> 3);
        if shift == 0 {
            return hi;
        }
        let lo = self.stored((idx >> 3) + 1);
        (hi << shift) | (lo >> (8 - shift))
    }

    fn stored(&self, byte_idx: usize) -> u8 {
        self.bytes.get(byte_idx).copied().unwrap_or(0)
    }

    /// Iterate over the bits of this row as 0/1 values.
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(|i| self.bit(i))
    }

    /// Append a bit. Returns false, dropping the bit, if the row is full.
    pub fn push(&mut self, bit: u8) -> bool {
        if self.is_full() {
            return false;
        }
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit & 1 == 1 {
            self.bytes[self.len >> 3] |= 0x80 >> (self.len & 7);
        }
        self.len += 1;
        true
    }

    pub(crate) fn set_bit(&mut self, idx: usize, bit: u8) {
        let mask = 0x80 >> (idx & 7);
        if bit & 1 == 1 {
            self.bytes[idx >> 3] |= mask;
        } else {
            self.bytes[idx >> 3] &= !mask;
        }
    }

    /// Copy `num_bits` starting at bit `pos` into `out`, left justified, with the
    /// final partial byte zero padded. Bits past the end of the row read as zero.
    ///
    /// # Panics
    /// If `out` is shorter than `num_bits` rounded up to whole bytes.
    pub fn extract(&self, pos: usize, out: &mut [u8], num_bits: usize) {
        let num_bytes = num_bits.div_ceil(8);
        let out = &mut out[..num_bytes];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.byte_at(pos + i * 8);
        }
        // Bits past the end of the row must not leak into the output.
        let avail = self.len.saturating_sub(pos).min(num_bits);
        for i in avail..num_bytes * 8 {
            out[i >> 3] &= !(0x80 >> (i & 7));
        }
    }

    /// Flip every valid bit, leaving the padding bits zero.
    pub fn invert(&mut self) {
        for b in &mut self.bytes {
            *b = !*b;
        }
        if self.len % 8 != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xff << (8 - self.len % 8);
            }
        }
    }

    /// True when the first `num_bits` bits of both rows exist and are equal.
    #[must_use]
    pub fn eq_prefix(&self, other: &BitRow, num_bits: usize) -> bool {
        if self.len < num_bits || other.len < num_bits {
            return false;
        }
        let whole = num_bits / 8;
        if self.bytes[..whole] != other.bytes[..whole] {
            return false;
        }
        let rem = num_bits % 8;
        if rem == 0 {
            return true;
        }
        let mask = 0xff << (8 - rem);
        (self.bytes[whole] & mask) == (other.bytes[whole] & mask)
    }

    /// True when both rows have the same length and equal bits from `offset` on.
    #[must_use]
    pub fn eq_from(&self, other: &BitRow, offset: usize) -> bool {
        if self.len != other.len {
            return false;
        }
        if offset % 8 == 0 {
            let start = (offset / 8).min(self.bytes.len());
            return self.bytes[start..] == other.bytes[start..];
        }
        (offset..self.len).all(|i| self.bit(i) == other.bit(i))
    }
}
