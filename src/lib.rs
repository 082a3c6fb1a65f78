//! # iso8583 — ISO 8583 message codec
//!
//! A codec for ISO 8583-style financial messages: a declarative message
//! specification (data element number → named field format) drives `pack`
//! (typed field values → byte stream), `unpack` (byte stream → field values),
//! and `explain` (byte stream → human-readable rendering).
//!
//! ## Wire layout
//!
//! `[MTI: 4 or 2 bytes][primary bitmap: 8 bytes][secondary bitmap: 8 bytes
//! if DE 1 bit set][field 2]...[field N]`, fields in ascending DE order.
//! Bitmap bits are MSB-first: bit `i` (0-based across all bitmap bytes) is
//! DE `i + 1`; DE 1 is the secondary-present flag, never a real field.
//!
//! ## Field kinds
//!
//! - `n`: numeric digits, BCD (default) or ASCII
//! - `a` / `an` / `ans`: letters / letters+digits / printable ASCII,
//!   space padded to a fixed width
//! - `b`: raw bytes of a fixed width (hex text accepted on encode)
//! - `bitmap`: the reserved DE 1 format, 8 or 16 bytes
//! - `LLVAR*` / `LLLVAR*`: variable length with a 2- or 3-digit header;
//!   payload, header encoding, and count mode are configurable with
//!   per-subtype defaults
//!
//! ## Usage
//!
//! ```
//! use iso8583::{FieldFormat, FieldSpec, Iso8583, MessageSpec, Value};
//! use std::collections::BTreeMap;
//!
//! let mut spec = MessageSpec::new();
//! spec.insert(0, FieldSpec::new("MTI", FieldFormat::numeric(4)?));
//! spec.insert(1, FieldSpec::new("Bitmap", FieldFormat::bitmap(8)?));
//! spec.insert(2, FieldSpec::new("PAN", FieldFormat::llvar_n(19)?));
//! spec.insert(3, FieldSpec::new("Processing Code", FieldFormat::numeric(6)?));
//!
//! let iso = Iso8583::new(spec)?;
//!
//! let mut fields = BTreeMap::new();
//! fields.insert(2, Value::from("4761731234567890"));
//! fields.insert(3, Value::from("000000"));
//!
//! let packed = iso.pack("0200", &fields)?;
//! let unpacked = iso.unpack(&packed.bytes)?;
//! assert_eq!(unpacked.mti, "0200");
//! assert_eq!(unpacked.fields, fields);
//! # Ok::<(), iso8583::CodecError>(())
//! ```

pub mod bcd;
pub mod bitmap;
pub mod error;
pub mod fields;
pub mod format;
pub mod lengths;
pub mod message;
pub mod value;

pub use bitmap::{build_bitmap, parse_bitmap, BitmapConstraint};
pub use error::CodecError;
pub use format::{
    apply_var_defaults, FieldFormat, Kind, LenCountMode, LenHeaderEncoding, NumericEncoding,
    ResolvedVar, VarFormat, VarPayload,
};
pub use message::{FieldSpec, Iso8583, MessageSpec, PackedMessage, UnpackedMessage};
pub use value::Value;
