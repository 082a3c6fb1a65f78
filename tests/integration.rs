//! Integration tests: full-message pack/unpack round trips across every field
//! kind, explain rendering, and secondary-bitmap handling.

use std::collections::BTreeMap;

use iso8583::{
    CodecError, FieldFormat, FieldSpec, Iso8583, LenHeaderEncoding, MessageSpec, NumericEncoding,
    Value, VarFormat, VarPayload,
};

fn all_formats_spec() -> MessageSpec {
    let mut spec = MessageSpec::new();
    spec.insert(0, FieldSpec::new("MTI", FieldFormat::numeric(4).expect("fmt")));
    spec.insert(1, FieldSpec::new("Bitmap", FieldFormat::bitmap(8).expect("fmt")));

    spec.insert(2, FieldSpec::new("PAN", FieldFormat::llvar_n(19).expect("fmt")));
    spec.insert(3, FieldSpec::new("Processing Code", FieldFormat::numeric(6).expect("fmt")));
    spec.insert(4, FieldSpec::new("Amount", FieldFormat::numeric(12).expect("fmt")));
    spec.insert(5, FieldSpec::new("Alpha field", FieldFormat::alpha(5).expect("fmt")));
    spec.insert(6, FieldSpec::new("Alphanumeric", FieldFormat::alphanumeric(10).expect("fmt")));
    spec.insert(
        7,
        FieldSpec::new("AlphanumericSpec", FieldFormat::alphanumeric_special(12).expect("fmt")),
    );
    spec.insert(8, FieldSpec::new("Binary data", FieldFormat::binary(4).expect("fmt")));

    spec.insert(20, FieldSpec::new("LLVAR alpha", FieldFormat::llvar_an(20).expect("fmt")));
    spec.insert(21, FieldSpec::new("LLVAR ans", FieldFormat::llvar_ans(20).expect("fmt")));
    spec.insert(22, FieldSpec::new("LLLVAR alpha", FieldFormat::lllvar_an(999).expect("fmt")));
    spec.insert(23, FieldSpec::new("LLLVAR ans", FieldFormat::lllvar_ans(999).expect("fmt")));
    spec.insert(24, FieldSpec::new("LLLVAR numeric", FieldFormat::lllvar_n(999).expect("fmt")));
    spec
}

fn all_formats_fields() -> BTreeMap<u8, Value> {
    let mut fields = BTreeMap::new();
    fields.insert(2, Value::from("4761731234567890"));
    fields.insert(3, Value::from("000000"));
    fields.insert(4, Value::from("000000012345"));
    fields.insert(5, Value::from("ABCDE"));
    fields.insert(6, Value::from("ABC123XYZ9"));
    fields.insert(7, Value::from("ABCDE*FGHIJ!"));
    fields.insert(8, Value::from(b"abcd".to_vec()));
    fields.insert(20, Value::from("ALPHAVAR"));
    fields.insert(21, Value::from("ANS_VAR!@#"));
    fields.insert(22, Value::from("ALPHALONGVAR"));
    fields.insert(23, Value::from("ANS_LONG_VAR*&^"));
    fields.insert(24, Value::from("1234567890"));
    fields
}

#[test]
fn round_trips_one_of_every_format() {
    let iso = Iso8583::new(all_formats_spec()).expect("engine");
    let fields = all_formats_fields();

    let packed = iso.pack("0200", &fields).expect("pack");
    let unpacked = iso.unpack(&packed.bytes).expect("unpack");

    assert_eq!(unpacked.mti, "0200");
    assert_eq!(unpacked.fields, fields);
    assert_eq!(unpacked.bytes_read, packed.bytes.len());
}

#[test]
fn explain_renders_one_line_per_field() {
    let iso = Iso8583::new(all_formats_spec()).expect("engine");
    let packed = iso.pack("0200", &all_formats_fields()).expect("pack");
    let explain = iso.explain(&packed.bytes).expect("explain");

    let lines: Vec<&str> = explain.lines().collect();
    assert_eq!(lines[0], "MTI: 0200");
    assert_eq!(lines.len(), 1 + all_formats_fields().len());

    assert_eq!(lines[1], "002 PAN (LLVARn, len=19): 4761731234567890");
    assert_eq!(lines[2], "003 Processing Code (n, len=6): 000000");
    assert!(explain.contains("005 Alpha field (a, len=5): ABCDE"));
    assert!(explain.contains("008 Binary data (b, len=4): 61626364"));
    assert!(explain.contains("024 LLLVAR numeric (LLLVARn, len=999): 1234567890"));
}

#[test]
fn secondary_bitmap_round_trip() {
    let mut spec = MessageSpec::new();
    spec.insert(0, FieldSpec::new("MTI", FieldFormat::numeric(4).expect("fmt")));
    spec.insert(1, FieldSpec::new("Bitmap", FieldFormat::bitmap(16).expect("fmt")));
    spec.insert(3, FieldSpec::new("Proc", FieldFormat::numeric(6).expect("fmt")));
    spec.insert(4, FieldSpec::new("Amount", FieldFormat::numeric(12).expect("fmt")));
    spec.insert(70, FieldSpec::new("Network Mgmt Code", FieldFormat::numeric(3).expect("fmt")));
    let iso = Iso8583::new(spec).expect("engine");

    let mut fields = BTreeMap::new();
    fields.insert(3, Value::from("000000"));
    fields.insert(4, Value::from("000000010000"));
    fields.insert(70, Value::from("301"));

    let packed = iso.pack("0200", &fields).expect("pack");
    // BCD MTI is 2 bytes; the primary bitmap's first byte must flag the secondary.
    assert_ne!(packed.bytes[2] & 0x80, 0);

    let unpacked = iso.unpack(&packed.bytes).expect("unpack");
    assert_eq!(unpacked.mti, "0200");
    assert_eq!(unpacked.fields, fields);

    let explain = iso.explain(&packed.bytes).expect("explain");
    assert!(explain.contains("070 Network Mgmt Code"));
    assert!(explain.contains("301"));
}

#[test]
fn de_above_64_rejected_under_primary_only_spec() {
    let mut spec = MessageSpec::new();
    spec.insert(1, FieldSpec::new("Bitmap", FieldFormat::bitmap(8).expect("fmt")));
    spec.insert(70, FieldSpec::new("Net Code", FieldFormat::numeric(3).expect("fmt")));
    let iso = Iso8583::new(spec).expect("engine");

    let mut fields = BTreeMap::new();
    fields.insert(70, Value::from("301"));
    assert!(matches!(
        iso.pack("0800", &fields),
        Err(CodecError::BitmapConstraint(_))
    ));
}

#[test]
fn ascii_everywhere_round_trip() {
    let mut spec = MessageSpec::new();
    spec.insert(
        0,
        FieldSpec::new("MTI", FieldFormat::numeric_with(4, NumericEncoding::Ascii).expect("fmt")),
    );
    spec.insert(1, FieldSpec::new("Bitmap", FieldFormat::bitmap(8).expect("fmt")));
    spec.insert(
        2,
        FieldSpec::new(
            "Track data",
            FieldFormat::Var(
                VarFormat::llvar_ans(37)
                    .expect("fmt")
                    .with_len_header(LenHeaderEncoding::Ascii),
            ),
        ),
    );
    spec.insert(
        3,
        FieldSpec::new("Proc", FieldFormat::numeric_with(6, NumericEncoding::Ascii).expect("fmt")),
    );
    let iso = Iso8583::new(spec).expect("engine");

    let mut fields = BTreeMap::new();
    fields.insert(2, Value::from("4761731234567890=250912345"));
    fields.insert(3, Value::from("300000"));

    let packed = iso.pack("0100", &fields).expect("pack");
    assert_eq!(&packed.bytes[..4], b"0100");
    // ASCII length header after the 8-byte bitmap.
    assert_eq!(&packed.bytes[12..14], b"26");

    let unpacked = iso.unpack(&packed.bytes).expect("unpack");
    assert_eq!(unpacked.mti, "0100");
    assert_eq!(unpacked.fields, fields);
}

#[test]
fn binary_var_payload_round_trip() {
    let mut spec = MessageSpec::new();
    spec.insert(1, FieldSpec::new("Bitmap", FieldFormat::bitmap(8).expect("fmt")));
    spec.insert(
        55,
        FieldSpec::new(
            "ICC data",
            FieldFormat::Var(VarFormat::lllvar(255).expect("fmt").with_payload(VarPayload::Binary)),
        ),
    );
    let iso = Iso8583::new(spec).expect("engine");

    let icc = vec![0x9f, 0x26, 0x08, 0xaa, 0xbb, 0xcc, 0xdd, 0xee];
    let mut fields = BTreeMap::new();
    fields.insert(55, Value::from(icc.clone()));

    let packed = iso.pack("0200", &fields).expect("pack");
    let unpacked = iso.unpack(&packed.bytes).expect("unpack");
    assert_eq!(unpacked.fields.get(&55), Some(&Value::from(icc)));
}

#[test]
fn unpack_fails_on_truncated_field() {
    let iso = Iso8583::new(all_formats_spec()).expect("engine");
    let mut fields = BTreeMap::new();
    fields.insert(5, Value::from("ABCDE"));
    let packed = iso.pack("0200", &fields).expect("pack");

    assert!(matches!(
        iso.unpack(&packed.bytes[..packed.bytes.len() - 2]),
        Err(CodecError::Underrun(_))
    ));
}

#[test]
fn unpack_fails_on_wire_de_without_spec_entry() {
    // Pack under a spec that knows DE 12, unpack under one that does not.
    let mut packer_spec = MessageSpec::new();
    packer_spec.insert(12, FieldSpec::new("Local time", FieldFormat::numeric(6).expect("fmt")));
    let packer = Iso8583::new(packer_spec).expect("engine");

    let mut fields = BTreeMap::new();
    fields.insert(12, Value::from("131415"));
    let packed = packer.pack("0200", &fields).expect("pack");

    let unpacker = Iso8583::new(MessageSpec::new()).expect("engine");
    assert!(matches!(
        unpacker.unpack(&packed.bytes),
        Err(CodecError::UnknownField(12))
    ));
}

#[test]
fn numeric_widening_is_the_only_round_trip_change() {
    let mut spec = MessageSpec::new();
    spec.insert(4, FieldSpec::new("Amount", FieldFormat::numeric(12).expect("fmt")));
    let iso = Iso8583::new(spec).expect("engine");

    let mut fields = BTreeMap::new();
    fields.insert(4, Value::from(12345u64));
    let packed = iso.pack("0200", &fields).expect("pack");
    let unpacked = iso.unpack(&packed.bytes).expect("unpack");
    assert_eq!(unpacked.fields.get(&4), Some(&Value::from("000000012345")));
}
