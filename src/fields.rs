//! Per-kind field encoders and decoders.
//!
//! Each pair is pure and stateless: encode takes the DE number (for error
//! context), the resolved format and a value and returns bytes; decode takes
//! the DE number, format, buffer and offset and returns `(value, bytes_read)`.

use crate::bcd::{digits_only, from_bcd, to_bcd};
use crate::error::CodecError;
use crate::format::{
    apply_var_defaults, FieldFormat, Kind, LenCountMode, NumericEncoding, VarFormat, VarPayload,
};
use crate::lengths::{read_len_header, write_len_header};
use crate::value::Value;

fn underrun(de: u8) -> CodecError {
    CodecError::Underrun(format!("DE {de}: buffer too short"))
}

fn value_err(de: u8, reason: impl Into<String>) -> CodecError {
    CodecError::Value {
        de,
        reason: reason.into(),
    }
}

/// Encode one field per its format. Dispatch is exhaustive over the kind set;
/// a bitmap format reaching this point is a configuration error.
pub fn encode_field(de: u8, format: &FieldFormat, value: &Value) -> Result<Vec<u8>, CodecError> {
    match format {
        FieldFormat::Numeric { length, encoding } => encode_numeric(de, *length, *encoding, value),
        FieldFormat::Alpha { length } => encode_alpha(de, Kind::Alpha, *length, value),
        FieldFormat::AlphaNumeric { length } => encode_alpha(de, Kind::AlphaNumeric, *length, value),
        FieldFormat::AlphaNumericSpecial { length } => {
            encode_alpha(de, Kind::AlphaNumericSpecial, *length, value)
        }
        FieldFormat::Binary { length } => encode_binary(de, *length, value),
        FieldFormat::Var(f) => encode_var(de, f, value),
        FieldFormat::Bitmap { .. } => Err(CodecError::Unsupported(Kind::Bitmap)),
    }
}

/// Decode one field per its format, returning the value and the byte count
/// consumed from `buf` at `offset`.
pub fn decode_field(
    de: u8,
    format: &FieldFormat,
    buf: &[u8],
    offset: usize,
) -> Result<(Value, usize), CodecError> {
    match format {
        FieldFormat::Numeric { length, encoding } => decode_numeric(de, *length, *encoding, buf, offset),
        FieldFormat::Alpha { length } => decode_alpha(de, Kind::Alpha, *length, buf, offset),
        FieldFormat::AlphaNumeric { length } => {
            decode_alpha(de, Kind::AlphaNumeric, *length, buf, offset)
        }
        FieldFormat::AlphaNumericSpecial { length } => {
            decode_alpha(de, Kind::AlphaNumericSpecial, *length, buf, offset)
        }
        FieldFormat::Binary { length } => decode_binary(de, *length, buf, offset),
        FieldFormat::Var(f) => decode_var(de, f, buf, offset),
        FieldFormat::Bitmap { .. } => Err(CodecError::Unsupported(Kind::Bitmap)),
    }
}

fn numeric_text(de: u8, value: &Value) -> Result<String, CodecError> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Num(n) => Ok(n.to_string()),
        Value::Bytes(_) => Err(value_err(de, "numeric field expects text or a number")),
    }
}

/// Numeric: digits only, left zero-padded to the declared digit count.
/// ASCII encoding emits one byte per digit, BCD packs two per byte.
pub fn encode_numeric(
    de: u8,
    length: usize,
    encoding: NumericEncoding,
    value: &Value,
) -> Result<Vec<u8>, CodecError> {
    let raw = numeric_text(de, value)?;
    digits_only(&raw)?;
    let s = format!("{:0>width$}", raw, width = length);
    match encoding {
        NumericEncoding::Ascii => Ok(s.into_bytes()),
        NumericEncoding::Bcd => to_bcd(&s),
    }
}

pub fn decode_numeric(
    de: u8,
    length: usize,
    encoding: NumericEncoding,
    buf: &[u8],
    offset: usize,
) -> Result<(Value, usize), CodecError> {
    match encoding {
        NumericEncoding::Ascii => {
            let slice = buf.get(offset..offset + length).ok_or_else(|| underrun(de))?;
            Ok((Value::Text(String::from_utf8_lossy(slice).into_owned()), length))
        }
        NumericEncoding::Bcd => {
            let read = (length + 1) / 2;
            let slice = buf.get(offset..offset + read).ok_or_else(|| underrun(de))?;
            Ok((Value::Text(from_bcd(slice, length)?), read))
        }
    }
}

fn alpha_class_ok(kind: Kind, s: &str) -> bool {
    match kind {
        Kind::Alpha => s.chars().all(|c| c.is_ascii_alphabetic()),
        Kind::AlphaNumeric => s.chars().all(|c| c.is_ascii_alphanumeric()),
        Kind::AlphaNumericSpecial => s.chars().all(|c| matches!(c, ' '..='~')),
        _ => false,
    }
}

/// Alpha family: validated against the kind's character class, right-padded
/// with spaces to the declared width.
pub fn encode_alpha(de: u8, kind: Kind, length: usize, value: &Value) -> Result<Vec<u8>, CodecError> {
    let s = value
        .as_text()
        .ok_or_else(|| value_err(de, format!("{kind} field expects text")))?;
    if s.len() > length {
        return Err(value_err(
            de,
            format!("{kind} value of {} chars exceeds declared length {length}", s.len()),
        ));
    }
    if !alpha_class_ok(kind, s) {
        return Err(value_err(de, format!("value violates the {kind} character class")));
    }
    let mut out = s.as_bytes().to_vec();
    out.resize(length, b' ');
    Ok(out)
}

pub fn decode_alpha(
    de: u8,
    kind: Kind,
    length: usize,
    buf: &[u8],
    offset: usize,
) -> Result<(Value, usize), CodecError> {
    let slice = buf.get(offset..offset + length).ok_or_else(|| underrun(de))?;
    let s = String::from_utf8_lossy(slice).trim_end_matches(' ').to_string();
    if !alpha_class_ok(kind, &s) {
        return Err(value_err(de, format!("decoded value violates the {kind} character class")));
    }
    Ok((Value::Text(s), length))
}

fn hex_decode(de: u8, s: &str) -> Result<Vec<u8>, CodecError> {
    if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(value_err(de, format!("invalid hex string {s:?}")));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| value_err(de, format!("invalid hex string {s:?}")))
        })
        .collect()
}

/// Binary: a byte buffer, or hex text, of exactly the declared byte count.
pub fn encode_binary(de: u8, length: usize, value: &Value) -> Result<Vec<u8>, CodecError> {
    let payload = match value {
        Value::Bytes(b) => b.clone(),
        Value::Text(s) => hex_decode(de, s)?,
        Value::Num(_) => return Err(value_err(de, "binary field expects bytes or hex text")),
    };
    if payload.len() != length {
        return Err(value_err(
            de,
            format!("expected exactly {length} bytes, got {}", payload.len()),
        ));
    }
    Ok(payload)
}

pub fn decode_binary(
    de: u8,
    length: usize,
    buf: &[u8],
    offset: usize,
) -> Result<(Value, usize), CodecError> {
    let slice = buf.get(offset..offset + length).ok_or_else(|| underrun(de))?;
    Ok((Value::Bytes(slice.to_vec()), length))
}

/// A built variable-length payload plus the lengths its header may count.
struct VarPayloadBytes {
    bytes: Vec<u8>,
    byte_len: usize,
    digit_len: usize,
}

fn build_payload(de: u8, enc: VarPayload, value: &Value) -> Result<VarPayloadBytes, CodecError> {
    match enc {
        VarPayload::Ascii => {
            let s = match value {
                Value::Text(s) => s.clone(),
                Value::Num(n) => n.to_string(),
                Value::Bytes(_) => return Err(value_err(de, "ASCII payload expects text")),
            };
            let bytes = s.into_bytes();
            let byte_len = bytes.len();
            Ok(VarPayloadBytes { bytes, byte_len, digit_len: 0 })
        }
        VarPayload::Binary => {
            let bytes = match value {
                Value::Bytes(b) => b.clone(),
                Value::Text(s) => hex_decode(de, s)?,
                Value::Num(_) => return Err(value_err(de, "binary payload expects bytes or hex text")),
            };
            let byte_len = bytes.len();
            Ok(VarPayloadBytes { bytes, byte_len, digit_len: 0 })
        }
        VarPayload::BcdDigits => {
            let digits = match value {
                Value::Text(s) => s.clone(),
                Value::Num(n) => n.to_string(),
                Value::Bytes(_) => return Err(value_err(de, "BCD payload expects digit text or a number")),
            };
            let bytes = to_bcd(&digits)?;
            Ok(VarPayloadBytes {
                byte_len: bytes.len(),
                digit_len: digits.len(),
                bytes,
            })
        }
    }
}

/// Variable-length: length header (2 or 3 digits per kind) followed by the
/// payload. The logical length (digits for BCD payloads, bytes otherwise) is
/// checked against the format's declared maximum before anything is written.
pub fn encode_var(de: u8, f: &VarFormat, value: &Value) -> Result<Vec<u8>, CodecError> {
    let resolved = apply_var_defaults(de, f)?;
    let payload = build_payload(de, resolved.payload, value)?;

    let logical = if resolved.payload == VarPayload::BcdDigits {
        payload.digit_len
    } else {
        payload.byte_len
    };
    if logical > f.length() {
        return Err(value_err(
            de,
            format!("length {logical} exceeds the declared maximum {}", f.length()),
        ));
    }

    let header_value = match resolved.len_counts {
        LenCountMode::Digits => payload.digit_len,
        LenCountMode::Bytes => payload.byte_len,
    };
    let mut out = write_len_header(header_value, f.header_digits(), resolved.len_header)?;
    out.extend_from_slice(&payload.bytes);
    Ok(out)
}

pub fn decode_var(
    de: u8,
    f: &VarFormat,
    buf: &[u8],
    offset: usize,
) -> Result<(Value, usize), CodecError> {
    let resolved = apply_var_defaults(de, f)?;
    let (header_value, header_bytes) =
        read_len_header(buf, offset, f.header_digits(), resolved.len_header)?;

    let byte_span = match resolved.len_counts {
        LenCountMode::Bytes => header_value,
        LenCountMode::Digits => (header_value + 1) / 2,
    };
    let start = offset + header_bytes;
    let slice = buf.get(start..start + byte_span).ok_or_else(|| underrun(de))?;
    let read = header_bytes + byte_span;

    match resolved.payload {
        VarPayload::BcdDigits => {
            let digit_count = match resolved.len_counts {
                LenCountMode::Digits => header_value,
                LenCountMode::Bytes => byte_span * 2,
            };
            Ok((Value::Text(from_bcd(slice, digit_count)?), read))
        }
        VarPayload::Ascii => Ok((Value::Text(String::from_utf8_lossy(slice).into_owned()), read)),
        VarPayload::Binary => Ok((Value::Bytes(slice.to_vec()), read)),
    }
}
