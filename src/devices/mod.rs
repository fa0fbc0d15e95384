//! Reference device decoders.
//!
//! Each covers a different framing and integrity shape: fixed-length rows with a
//! nibble checksum, a preamble search with CRC-8 and sum, repeated-row framing with
//! inverted bits, and a preamble search with an LFSR digest.
mod bresser_3ch;
mod fineoffset_ws80;
mod tfa_14_1504_v2;
mod tfa_twin_plus;

pub use bresser_3ch::Bresser3ch;
pub use fineoffset_ws80::FineOffsetWs80;
pub use tfa_14_1504_v2::Tfa141504v2;
pub use tfa_twin_plus::TfaTwinPlus;

use crate::decoder::Decoder;

/// One instance of every reference decoder, in registration order.
#[must_use]
pub fn all() -> Vec<Box<dyn Decoder>> {
    vec![
        Box::new(TfaTwinPlus::new()),
        Box::new(Bresser3ch::new()),
        Box::new(FineOffsetWs80::new()),
        Box::new(Tfa141504v2::new()),
    ]
}
