//! Two-dimensional bit buffer produced by pulse demodulation.
//!
//! A [BitBuffer] holds one [BitRow] per burst of bits the demodulator saw between
//! resets, plus the number of sync pulses that preceded each row. Decoders search the
//! rows for preambles at arbitrary bit offsets and extract byte aligned copies of the
//! payload for further processing.
mod line_code;
mod parse;
mod row;

pub use row::BitRow;

use tracing::trace;

/// Bit buffer of up to [BitBuffer::MAX_ROWS] rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    rows: Vec<BitRow>,
    syncs_before_row: Vec<u16>,
}

impl BitBuffer {
    /// Maximum number of rows.
    pub const MAX_ROWS: usize = 50;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from byte packed rows of the given bit lengths.
    #[must_use]
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a [u8], usize)>,
    {
        let mut bits = BitBuffer::new();
        for (bytes, num_bits) in rows {
            bits.push_row(BitRow::from_bytes(bytes, num_bits));
        }
        bits
    }

    /// Remove all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.syncs_before_row.clear();
    }

    fn ensure_row(&mut self) {
        if self.rows.is_empty() {
            self.rows.push(BitRow::new());
            self.syncs_before_row.push(0);
        }
    }

    /// Add a single bit to the end of the current row, creating the first row if
    /// necessary. Bits added to a full row are dropped.
    pub fn add_bit(&mut self, bit: u8) {
        self.ensure_row();
        if let Some(row) = self.rows.last_mut() {
            if !row.push(bit) {
                trace!(len = row.len(), "row full, dropping bit");
            }
        }
    }

    /// Start a new row. When all rows are in use the last row is cleared instead.
    pub fn add_row(&mut self) {
        self.ensure_row();
        if self.rows.len() < Self::MAX_ROWS {
            self.rows.push(BitRow::new());
            self.syncs_before_row.push(0);
        } else if let Some(row) = self.rows.last_mut() {
            trace!("row limit reached, clearing last row");
            *row = BitRow::new();
        }
    }

    /// Count a sync pulse, starting a new row first if the current one holds bits.
    pub fn add_sync(&mut self) {
        self.ensure_row();
        if self.rows.last().is_some_and(|r| !r.is_empty()) {
            self.add_row();
        }
        if let Some(count) = self.syncs_before_row.last_mut() {
            *count = count.saturating_add(1);
        }
    }

    /// Append a complete row. Returns false, leaving the buffer unchanged, when
    /// the buffer is already at [BitBuffer::MAX_ROWS].
    pub fn push_row(&mut self, row: BitRow) -> bool {
        if self.rows.len() >= Self::MAX_ROWS {
            return false;
        }
        self.rows.push(row);
        self.syncs_before_row.push(0);
        true
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of valid bits in `row`.
    ///
    /// # Panics
    /// If `row` is out of range.
    #[must_use]
    pub fn bits_per_row(&self, row: usize) -> usize {
        self.rows[row].len()
    }

    /// Number of sync pulses seen before `row`.
    ///
    /// # Panics
    /// If `row` is out of range.
    #[must_use]
    pub fn syncs_before_row(&self, row: usize) -> u16 {
        self.syncs_before_row[row]
    }

    /// # Panics
    /// If `row` is out of range.
    #[must_use]
    pub fn row(&self, row: usize) -> &BitRow {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &BitRow> {
        self.rows.iter()
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut BitRow> {
        self.rows.iter_mut()
    }

    /// Search `row`, starting from bit `start`, for the first `pattern_bits` bits of
    /// `pattern`. The pattern starts in the high bit, e.g., searching for `011011`
    /// uses the pattern byte `0x6c`.
    ///
    /// Returns the bit position of the first match, or the length of the row if the
    /// pattern is not found. Callers must compare against [BitBuffer::bits_per_row].
    ///
    /// # Panics
    /// If `row` is out of range or `pattern` holds fewer than `pattern_bits` bits.
    #[must_use]
    pub fn search(&self, row: usize, start: usize, pattern: &[u8], pattern_bits: usize) -> usize {
        let bits = &self.rows[row];
        let len = bits.len();
        if pattern_bits == 0 || start + pattern_bits > len {
            return len;
        }
        let whole = pattern_bits / 8;
        let rem = pattern_bits % 8;
        // significant bits of the trailing partial pattern byte
        let tail_mask = if rem == 0 { 0 } else { 0xffu8 << (8 - rem) };

        (start..=len - pattern_bits)
            .find(|&pos| {
                pattern[..whole]
                    .iter()
                    .enumerate()
                    .all(|(j, p)| bits.byte_at(pos + j * 8) == *p)
                    && (bits.byte_at(pos + whole * 8) ^ pattern.get(whole).copied().unwrap_or(0))
                        & tail_mask
                        == 0
            })
            .unwrap_or(len)
    }

    /// Extract `num_bits` bits of `row` starting at bit `pos` into `out`, left
    /// justified, with the final partial byte zero padded.
    ///
    /// # Panics
    /// If `row` is out of range or `out` is too small for `num_bits`.
    pub fn extract_bytes(&self, row: usize, pos: usize, out: &mut [u8], num_bits: usize) {
        self.rows[row].extract(pos, out, num_bits);
    }

    /// Like [BitBuffer::extract_bytes] but returns a newly allocated buffer.
    #[must_use]
    pub fn extract(&self, row: usize, pos: usize, num_bits: usize) -> Vec<u8> {
        let mut out = vec![0u8; num_bits.div_ceil(8)];
        self.extract_bytes(row, pos, &mut out, num_bits);
        out
    }

    /// Invert all bits in all rows.
    pub fn invert(&mut self) {
        for row in &mut self.rows {
            row.invert();
        }
    }

    /// True when rows `a` and `b` are the same length and the bytes covering their
    /// first `max_bits` bits are identical.
    ///
    /// # Panics
    /// If either row is out of range.
    #[must_use]
    pub fn compare_rows(&self, a: usize, b: usize, max_bits: usize) -> bool {
        let (ra, rb) = (&self.rows[a], &self.rows[b]);
        if ra.len() != rb.len() {
            return false;
        }
        let n = ra.len().min(max_bits).div_ceil(8);
        ra.as_bytes()[..n] == rb.as_bytes()[..n]
    }

    /// Count the rows, including `row` itself, that have the same length as `row`
    /// and identical bits from `bit_offset` to the end.
    ///
    /// # Panics
    /// If `row` is out of range.
    #[must_use]
    pub fn count_repeats(&self, row: usize, bit_offset: usize) -> usize {
        let this = &self.rows[row];
        self.rows.iter().filter(|r| this.eq_from(r, bit_offset)).count()
    }

    /// Find the first row of at least `min_bits` bits that is repeated, in full, at
    /// least `min_repeats` times (counting itself).
    #[must_use]
    pub fn find_repeated_row(&self, min_repeats: usize, min_bits: usize) -> Option<usize> {
        (0..self.rows.len()).find(|&i| {
            self.rows[i].len() >= min_bits && self.count_repeats(i, 0) >= min_repeats
        })
    }

    /// Find the first row whose leading `min_bits` bits are shared by at least
    /// `min_repeats` rows (counting itself). Trailing bits are ignored, which
    /// tolerates unreliable padding at the end of each repeat.
    #[must_use]
    pub fn find_repeated_prefix(&self, min_repeats: usize, min_bits: usize) -> Option<usize> {
        (0..self.rows.len()).find(|&i| {
            let this = &self.rows[i];
            this.len() >= min_bits
                && self
                    .rows
                    .iter()
                    .filter(|r| this.eq_prefix(r, min_bits))
                    .count()
                    >= min_repeats
        })
    }

    /// Emit the buffer contents at TRACE level.
    pub fn trace(&self, label: &str) {
        trace!(rows = self.num_rows(), "{label}\n{self}");
    }
}
