//! Codec error type.
//!
//! Every failure is synchronous and fail-fast: the first error encountered
//! propagates to the caller and no partial output is ever returned.

use crate::format::Kind;

/// All failures the codec can produce.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Message specification is invalid (reserved DE shape, format bounds,
    /// or an invalid variable-length option combination).
    #[error("spec: {0}")]
    Spec(String),
    /// A supplied field value failed validation against its format.
    #[error("DE {de}: {reason}")]
    Value { de: u8, reason: String },
    /// A value that must be decimal digits contained something else.
    #[error("expected digits only, got {0:?}")]
    ExpectedDigits(String),
    /// A BCD byte carried a nibble outside 0..=9.
    #[error("invalid BCD byte 0x{0:02x}")]
    InvalidBcd(u8),
    /// A length header did not parse as a decimal number.
    #[error("invalid length header {0:?}")]
    InvalidLenHeader(String),
    /// Buffer too short for a field, length header, or bitmap.
    #[error("underrun: {0}")]
    Underrun(String),
    /// DE > 64 or a secondary bitmap under a 64-bit-only constraint.
    #[error("bitmap: {0}")]
    BitmapConstraint(String),
    /// A data element outside 2..=128 was referenced in a bitmap.
    #[error("DE {0} out of range 2..=128")]
    DeRange(u8),
    /// A data element present in the input has no spec entry.
    #[error("no spec entry for DE {0}")]
    UnknownField(u8),
    /// A format kind reached a dispatch point that cannot handle it.
    #[error("unsupported format: {0}")]
    Unsupported(Kind),
    /// MTI is not exactly four decimal digits.
    #[error("invalid MTI {0:?} (expect 4 digits)")]
    InvalidMti(String),
}
