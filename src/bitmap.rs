//! Presence bitmap: 8-byte primary, plus an 8-byte secondary when any DE > 64
//! is present.
//!
//! Bits are MSB-first: the bit at absolute position `i` (0-based across all
//! bitmap bytes) represents data element `i + 1`. Bit 0 (DE 1) is the
//! secondary-bitmap-present flag, a control bit rather than a payload field:
//! the builder sets it when secondary data exists and the parser strips it
//! from its result unconditionally.

use byteorder::{BigEndian, ByteOrder};

use crate::error::CodecError;

/// Whether a message may address data elements above 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapConstraint {
    /// 8-byte primary bitmap only: DEs 2..=64.
    Bits64,
    /// Primary plus secondary bitmap: DEs 2..=128.
    Bits128,
}

/// Build the presence bitmap for the given data elements (expected 2..=128).
///
/// Returns 8 bytes when every DE fits the primary bitmap, 16 bytes otherwise.
/// Fails if a secondary bitmap is needed under [`BitmapConstraint::Bits64`],
/// or if any DE falls outside 2..=128.
pub fn build_bitmap(present: &[u8], constraint: BitmapConstraint) -> Result<Vec<u8>, CodecError> {
    let needs_secondary = present.iter().any(|&de| de > 64);
    if needs_secondary && constraint == BitmapConstraint::Bits64 {
        return Err(CodecError::BitmapConstraint(
            "DE > 64 present but bitmap is constrained to 64 bits".to_string(),
        ));
    }

    let mut primary = 0u64;
    let mut secondary = 0u64;
    for &de in present {
        if !(2..=128).contains(&de) {
            return Err(CodecError::DeRange(de));
        }
        let bit = u64::from(de) - 1;
        if bit < 64 {
            primary |= 1u64 << (63 - bit);
        } else {
            secondary |= 1u64 << (127 - bit);
        }
    }
    if needs_secondary {
        // DE 1: the secondary-present flag.
        primary |= 1u64 << 63;
    }

    let mut out = vec![0u8; if needs_secondary { 16 } else { 8 }];
    BigEndian::write_u64(&mut out[..8], primary);
    if needs_secondary {
        BigEndian::write_u64(&mut out[8..], secondary);
    }
    Ok(out)
}

/// Parse an 8- or 16-byte presence bitmap into the ascending list of present
/// data elements. DE 1 (the secondary indicator) is excluded from the result
/// regardless of its value.
pub fn parse_bitmap(bytes: &[u8], constraint: BitmapConstraint) -> Result<Vec<u8>, CodecError> {
    if bytes.len() != 8 && bytes.len() != 16 {
        return Err(CodecError::Spec(format!(
            "bitmap must be 8 or 16 bytes, got {}",
            bytes.len()
        )));
    }
    if bytes.len() == 16 && constraint == BitmapConstraint::Bits64 {
        return Err(CodecError::BitmapConstraint(
            "secondary bitmap present but constrained to 64".to_string(),
        ));
    }

    let mut present = Vec::new();
    for (i, &byte) in bytes.iter().enumerate() {
        for bit in 0..8 {
            if byte & (0x80 >> bit) != 0 {
                let de = (i * 8 + bit + 1) as u8;
                if de != 1 {
                    present.push(de);
                }
            }
        }
    }
    Ok(present)
}
