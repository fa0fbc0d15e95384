//! The contract every device decoder implements.
//!
//! A decoder is a straight-line, fail-fast validation pipeline over one [BitBuffer]:
//! reject implausible row counts and lengths, locate the frame, extract it, verify
//! its integrity check, decode the fields and filter implausible values. The first
//! failing step determines the [DecodeError]. Decoders hold no state between calls.
use typed_builder::TypedBuilder;

use crate::{bitbuffer::BitBuffer, record::Record};

/// Reasons a decoder did not produce a record.
///
/// All of these are routine: most buffers are noise or belong to another protocol.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// A structural precondition failed, e.g., the preamble was not found.
    #[error("aborted early")]
    AbortEarly,
    /// Row count or bit length is implausible for the protocol.
    #[error("bad length")]
    AbortLength,
    /// The integrity check did not validate.
    #[error("integrity check failed")]
    FailMic,
    /// The frame validated but its content is implausible.
    #[error("sanity check failed")]
    FailSanity,
    #[error("decode failed")]
    FailOther,
}

impl DecodeError {
    /// Number of distinct failure kinds.
    pub const KINDS: usize = 5;

    /// Stable index of this kind in `0..KINDS`, for per-kind statistics.
    #[must_use]
    pub fn kind_index(&self) -> usize {
        match self {
            DecodeError::FailOther => 0,
            DecodeError::AbortLength => 1,
            DecodeError::AbortEarly => 2,
            DecodeError::FailMic => 3,
            DecodeError::FailSanity => 4,
        }
    }

    /// Legacy integer return code for this failure.
    #[must_use]
    pub fn code(&self) -> i32 {
        -(self.kind_index() as i32)
    }
}

/// The result of one decoder invocation on one buffer.
pub type DecodeOutcome = std::result::Result<Record, DecodeError>;

/// How the demodulator turns pulses into bits for a protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modulation {
    /// OOK, Manchester coding with a hardcoded zero bit.
    OokManchesterZerobit,
    /// OOK, NRZ or RZ pulse code; pulse is 1, no pulse is 0.
    OokPcm,
    /// OOK, pulse position coding; short gap is 0, long gap is 1.
    OokPpm,
    /// OOK, pulse width coding; short pulse is 1, long pulse is 0.
    OokPwm,
    OokPiwmRaw,
    OokPiwmDc,
    /// OOK, differential Manchester.
    OokDmc,
    OokPwmOsv1,
    OokNrzs,
    FskPcm,
    FskPwm,
    FskManchesterZerobit,
}

impl Modulation {
    #[must_use]
    pub fn is_fsk(&self) -> bool {
        matches!(
            self,
            Modulation::FskPcm | Modulation::FskPwm | Modulation::FskManchesterZerobit
        )
    }
}

/// Static description of a protocol.
///
/// Timing values are in microseconds and are consumed by the demodulator; the
/// registry only uses the name, priority, default enablement and field list.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Protocol {
    name: &'static str,
    modulation: Modulation,
    short_width: f32,
    #[builder(default)]
    long_width: f32,
    reset_limit: f32,
    #[builder(default)]
    gap_limit: f32,
    #[builder(default)]
    sync_width: f32,
    #[builder(default)]
    tolerance: f32,
    /// Decoders with a higher value run later, and only if no decoder with a lower
    /// value produced a record.
    #[builder(default)]
    priority: u32,
    /// Disabled unless explicitly enabled.
    #[builder(default)]
    disabled: bool,
    /// Ordered names of all fields the decoder can produce.
    fields: &'static [&'static str],
}

impl Protocol {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    #[must_use]
    pub fn short_width(&self) -> f32 {
        self.short_width
    }

    #[must_use]
    pub fn long_width(&self) -> f32 {
        self.long_width
    }

    #[must_use]
    pub fn reset_limit(&self) -> f32 {
        self.reset_limit
    }

    #[must_use]
    pub fn gap_limit(&self) -> f32 {
        self.gap_limit
    }

    #[must_use]
    pub fn sync_width(&self) -> f32 {
        self.sync_width
    }

    #[must_use]
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    #[must_use]
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// True if every field of `record` is declared, and the record's fields appear
    /// in the declared order. Conditional fields may be absent.
    #[must_use]
    pub fn conforms(&self, record: &Record) -> bool {
        let mut declared = self.fields.iter();
        record
            .fields()
            .all(|(name, _)| declared.any(|d| *d == name))
    }
}

/// A device protocol decoder.
pub trait Decoder: Send + Sync {
    /// Metadata describing this decoder's protocol.
    fn protocol(&self) -> &Protocol;

    /// Attempt to decode `bits`. Exactly one outcome is produced per call.
    ///
    /// Decoders that transform bits in place must do so on their own copy.
    fn decode(&self, bits: &BitBuffer) -> DecodeOutcome;
}
