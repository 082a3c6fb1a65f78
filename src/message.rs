//! Message engine: reserved-DE configuration, MTI handling, and the
//! pack/unpack/explain operations.
//!
//! Construction validates the reserved DE 0 (MTI) and DE 1 (bitmap) entries
//! and derives the MTI encoding and bitmap constraint once; pack/unpack/
//! explain are then stateless against that fixed configuration, so an
//! [`Iso8583`] instance can be shared and reused across many calls.

use std::collections::BTreeMap;

use crate::bcd::{from_bcd, to_bcd};
use crate::bitmap::{build_bitmap, parse_bitmap, BitmapConstraint};
use crate::error::CodecError;
use crate::fields::{decode_field, encode_field};
use crate::format::{FieldFormat, NumericEncoding};
use crate::value::Value;

/// A named field format, one entry in a [`MessageSpec`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub format: FieldFormat,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, format: FieldFormat) -> Self {
        FieldSpec {
            name: name.into(),
            format,
        }
    }
}

/// Message specification: data element number to named format.
///
/// DE 0 is reserved for the MTI (must be Numeric), DE 1 for the bitmap (must
/// be Bitmap); the variable field set uses DEs 2..=128.
pub type MessageSpec = BTreeMap<u8, FieldSpec>;

/// Output of [`Iso8583::pack`]: the MTI and the full wire bytes
/// (MTI + bitmap + fields in ascending DE order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedMessage {
    pub mti: String,
    pub bytes: Vec<u8>,
}

/// Output of [`Iso8583::unpack`].
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackedMessage {
    pub mti: String,
    pub fields: BTreeMap<u8, Value>,
    pub bytes_read: usize,
}

/// The message engine.
#[derive(Debug)]
pub struct Iso8583 {
    spec: MessageSpec,
    mti_encoding: NumericEncoding,
    bitmap_constraint: BitmapConstraint,
}

impl Iso8583 {
    /// Build an engine from a message spec, validating the reserved entries.
    pub fn new(spec: MessageSpec) -> Result<Self, CodecError> {
        let mut mti_encoding = NumericEncoding::default();
        if let Some(mti) = spec.get(&0) {
            match &mti.format {
                FieldFormat::Numeric { encoding, .. } => mti_encoding = *encoding,
                other => {
                    return Err(CodecError::Spec(format!(
                        "DE 0 (MTI) must be Numeric, got {}",
                        other.kind()
                    )))
                }
            }
        }

        let mut bitmap_constraint = BitmapConstraint::Bits64;
        if let Some(bm) = spec.get(&1) {
            match &bm.format {
                FieldFormat::Bitmap { length: 8 } => bitmap_constraint = BitmapConstraint::Bits64,
                FieldFormat::Bitmap { length: 16 } => bitmap_constraint = BitmapConstraint::Bits128,
                FieldFormat::Bitmap { length } => {
                    return Err(CodecError::Spec(format!(
                        "DE 1 bitmap must be 8 or 16 bytes, got {length}"
                    )))
                }
                other => {
                    return Err(CodecError::Spec(format!(
                        "DE 1 must be Bitmap, got {}",
                        other.kind()
                    )))
                }
            }
        }

        Ok(Iso8583 {
            spec,
            mti_encoding,
            bitmap_constraint,
        })
    }

    /// Serialize a message: MTI bytes, presence bitmap, then each present
    /// field in ascending DE order. Field map keys outside 2..=128 are
    /// ignored; a present DE without a spec entry fails before any encoding.
    pub fn pack(&self, mti: &str, fields: &BTreeMap<u8, Value>) -> Result<PackedMessage, CodecError> {
        assert_mti(mti)?;

        let present: Vec<u8> = fields
            .keys()
            .copied()
            .filter(|de| (2..=128).contains(de))
            .collect();
        for &de in &present {
            if !self.spec.contains_key(&de) {
                return Err(CodecError::UnknownField(de));
            }
        }

        let mut bytes = encode_mti(mti, self.mti_encoding)?;
        bytes.extend(build_bitmap(&present, self.bitmap_constraint)?);
        for &de in &present {
            let field = self.spec.get(&de).ok_or(CodecError::UnknownField(de))?;
            let value = fields.get(&de).ok_or(CodecError::UnknownField(de))?;
            bytes.extend(encode_field(de, &field.format, value)?);
        }

        Ok(PackedMessage {
            mti: mti.to_string(),
            bytes,
        })
    }

    /// Parse a message: MTI, primary bitmap (secondary if its high bit is
    /// set and the constraint allows it), then each present field in the
    /// order the bitmap yields.
    pub fn unpack(&self, buf: &[u8]) -> Result<UnpackedMessage, CodecError> {
        let (mti, mut offset) = decode_mti(buf, self.mti_encoding)?;
        assert_mti(&mti)?;

        let primary = buf
            .get(offset..offset + 8)
            .ok_or_else(|| CodecError::Underrun("primary bitmap".to_string()))?;
        let has_secondary = primary[0] & 0x80 != 0;
        if has_secondary && self.bitmap_constraint == BitmapConstraint::Bits64 {
            return Err(CodecError::BitmapConstraint(
                "secondary bitmap present but constrained to 64".to_string(),
            ));
        }
        let bitmap_len = if has_secondary { 16 } else { 8 };
        let bitmap = buf
            .get(offset..offset + bitmap_len)
            .ok_or_else(|| CodecError::Underrun("secondary bitmap".to_string()))?;
        offset += bitmap_len;

        let present = parse_bitmap(bitmap, self.bitmap_constraint)?;
        let mut fields = BTreeMap::new();
        for de in present {
            let field = self.spec.get(&de).ok_or(CodecError::UnknownField(de))?;
            let (value, read) = decode_field(de, &field.format, buf, offset)?;
            fields.insert(de, value);
            offset += read;
        }

        Ok(UnpackedMessage {
            mti,
            fields,
            bytes_read: offset,
        })
    }

    /// Unpack and render one line per field:
    /// `<DE, zero-padded to 3> <name> (<kind>, len=<length>): <value>`,
    /// preceded by an `MTI: <mti>` line.
    pub fn explain(&self, buf: &[u8]) -> Result<String, CodecError> {
        let decoded = self.unpack(buf)?;
        let mut lines = vec![format!("MTI: {}", decoded.mti)];
        for (de, value) in &decoded.fields {
            let field = self.spec.get(de).ok_or(CodecError::UnknownField(*de))?;
            lines.push(format!(
                "{de:03} {} ({}, len={}): {value}",
                field.name,
                field.format.kind(),
                field.format.length()
            ));
        }
        Ok(lines.join("\n"))
    }
}

fn assert_mti(mti: &str) -> Result<(), CodecError> {
    if mti.len() == 4 && mti.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CodecError::InvalidMti(mti.to_string()))
    }
}

// MTI codec: mirrors the numeric field codec, fixed at 4 digits (4 ASCII
// bytes or 2 BCD bytes).
fn encode_mti(mti: &str, enc: NumericEncoding) -> Result<Vec<u8>, CodecError> {
    match enc {
        NumericEncoding::Ascii => Ok(mti.as_bytes().to_vec()),
        NumericEncoding::Bcd => to_bcd(mti),
    }
}

fn decode_mti(buf: &[u8], enc: NumericEncoding) -> Result<(String, usize), CodecError> {
    match enc {
        NumericEncoding::Ascii => {
            let slice = buf
                .get(..4)
                .ok_or_else(|| CodecError::Underrun("MTI".to_string()))?;
            Ok((String::from_utf8_lossy(slice).into_owned(), 4))
        }
        NumericEncoding::Bcd => {
            let slice = buf
                .get(..2)
                .ok_or_else(|| CodecError::Underrun("MTI".to_string()))?;
            Ok((from_bcd(slice, 4)?, 2))
        }
    }
}
