//! Packed-BCD transcoding: decimal digit strings to 4-bit-per-digit bytes and back.

use crate::error::CodecError;

/// Validate that `s` contains only ASCII decimal digits.
pub fn digits_only(s: &str) -> Result<&str, CodecError> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        Ok(s)
    } else {
        Err(CodecError::ExpectedDigits(s.to_string()))
    }
}

/// Pack a digit string into BCD bytes, high nibble first.
/// Odd-length input is left-padded with a single `'0'`.
pub fn to_bcd(digits: &str) -> Result<Vec<u8>, CodecError> {
    let s = digits_only(digits)?;
    let mut out = Vec::with_capacity((s.len() + 1) / 2);
    // Pending high nibble; seeded with the implicit pad for odd lengths.
    let mut hi = if s.len() % 2 == 1 { Some(0u8) } else { None };
    for b in s.bytes() {
        let d = b - b'0';
        match hi.take() {
            Some(h) => out.push((h << 4) | d),
            None => hi = Some(d),
        }
    }
    Ok(out)
}

/// Expand BCD bytes into decimal digits and return the rightmost `digit_count`
/// characters. A nibble outside 0..=9 is a format error.
pub fn from_bcd(bytes: &[u8], digit_count: usize) -> Result<String, CodecError> {
    let mut s = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        for nib in [b >> 4, b & 0x0f] {
            if nib > 9 {
                return Err(CodecError::InvalidBcd(b));
            }
            s.push((b'0' + nib) as char);
        }
    }
    let start = s.len().saturating_sub(digit_count);
    Ok(s[start..].to_string())
}
