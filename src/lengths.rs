//! Fixed-digit-width length headers for variable-length fields, ASCII or BCD encoded.

use crate::bcd::{from_bcd, to_bcd};
use crate::error::CodecError;
use crate::format::LenHeaderEncoding;

/// Encode `value` as a zero-padded decimal string of exactly `digit_width`
/// digits, emitted as raw ASCII or packed BCD.
pub fn write_len_header(
    value: usize,
    digit_width: usize,
    enc: LenHeaderEncoding,
) -> Result<Vec<u8>, CodecError> {
    let s = format!("{:0width$}", value, width = digit_width);
    match enc {
        LenHeaderEncoding::Ascii => Ok(s.into_bytes()),
        LenHeaderEncoding::Bcd => to_bcd(&s),
    }
}

/// Decode a length header at `offset`, returning `(value, bytes_consumed)`.
///
/// ASCII headers occupy `digit_width` bytes, BCD headers `ceil(digit_width/2)`.
pub fn read_len_header(
    buf: &[u8],
    offset: usize,
    digit_width: usize,
    enc: LenHeaderEncoding,
) -> Result<(usize, usize), CodecError> {
    match enc {
        LenHeaderEncoding::Ascii => {
            let slice = buf
                .get(offset..offset + digit_width)
                .ok_or_else(|| CodecError::Underrun("length header".to_string()))?;
            let s = std::str::from_utf8(slice)
                .map_err(|_| CodecError::InvalidLenHeader(format!("{slice:02x?}")))?;
            let value = s
                .parse::<usize>()
                .map_err(|_| CodecError::InvalidLenHeader(s.to_string()))?;
            Ok((value, digit_width))
        }
        LenHeaderEncoding::Bcd => {
            let read = (digit_width + 1) / 2;
            let slice = buf
                .get(offset..offset + read)
                .ok_or_else(|| CodecError::Underrun("length header".to_string()))?;
            let s = from_bcd(slice, digit_width)?;
            let value = s
                .parse::<usize>()
                .map_err(|_| CodecError::InvalidLenHeader(s.clone()))?;
            Ok((value, read))
        }
    }
}
