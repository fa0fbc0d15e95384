//! Message integrity checks.
//!
//! Every function here is a pure transform over a byte slice plus the parameters of
//! the check. Protocols reuse generic CRC hardware with their own polynomials, so
//! nothing is auto-detected; decoders pass their protocol's constants directly and
//! compare the result against the check field extracted from the same frame.
use std::fmt;

mod crc;
mod lfsr;
mod sum;
mod whitening;

pub use crc::*;
pub use lfsr::*;
pub use sum::*;
pub use whitening::*;

/// The kind of check that validated a record, reported in its `mic` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mic {
    Crc,
    Checksum,
    Parity,
    /// Keyed LFSR digest.
    Digest,
}

impl Mic {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mic::Crc => "CRC",
            Mic::Checksum => "CHECKSUM",
            Mic::Parity => "PARITY",
            Mic::Digest => "DIGEST",
        }
    }
}

impl fmt::Display for Mic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
