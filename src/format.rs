//! Field format model: kinds, wire-shape options, validated constructors,
//! and variable-length default resolution.

use std::fmt;

use crate::error::CodecError;

/// Field kind: the closed set of supported wire shapes.
///
/// The eight variable-length kinds cross the LL/LLL header digit width with
/// the payload subtype (untyped, numeric, alphanumeric, alphanumeric-special).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Numeric,
    Alpha,
    AlphaNumeric,
    AlphaNumericSpecial,
    Binary,
    Bitmap,
    LlVar,
    LlVarN,
    LlVarAn,
    LlVarAns,
    LllVar,
    LllVarN,
    LllVarAn,
    LllVarAns,
}

impl Kind {
    /// Conventional ISO 8583 notation for this kind.
    pub fn notation(self) -> &'static str {
        match self {
            Kind::Numeric => "n",
            Kind::Alpha => "a",
            Kind::AlphaNumeric => "an",
            Kind::AlphaNumericSpecial => "ans",
            Kind::Binary => "b",
            Kind::Bitmap => "bitmap",
            Kind::LlVar => "LLVAR",
            Kind::LlVarN => "LLVARn",
            Kind::LlVarAn => "LLVARan",
            Kind::LlVarAns => "LLVARans",
            Kind::LllVar => "LLLVAR",
            Kind::LllVarN => "LLLVARn",
            Kind::LllVarAn => "LLLVARan",
            Kind::LllVarAns => "LLLVARans",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

/// Wire encoding for numeric fields and the MTI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericEncoding {
    #[default]
    Bcd,
    Ascii,
}

/// Encoding of a variable-length field's length header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LenHeaderEncoding {
    #[default]
    Bcd,
    Ascii,
}

/// Payload encoding for variable-length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarPayload {
    Ascii,
    Binary,
    BcdDigits,
}

/// What a variable-length header counts: payload bytes or logical digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LenCountMode {
    Bytes,
    Digits,
}

/// Variable-length format: an LL or LLL kind, its maximum logical length,
/// and the three optional wire settings resolved by [`apply_var_defaults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarFormat {
    kind: Kind,
    length: usize,
    payload: Option<VarPayload>,
    len_header: Option<LenHeaderEncoding>,
    len_counts: Option<LenCountMode>,
}

impl VarFormat {
    fn new(kind: Kind, length: usize) -> Result<Self, CodecError> {
        let cap = match kind {
            Kind::LlVar | Kind::LlVarN | Kind::LlVarAn | Kind::LlVarAns => 99,
            Kind::LllVar | Kind::LllVarN | Kind::LllVarAn | Kind::LllVarAns => 999,
            other => {
                return Err(CodecError::Spec(format!(
                    "{other} is not a variable-length kind"
                )))
            }
        };
        if length == 0 || length > cap {
            return Err(CodecError::Spec(format!(
                "{kind} length must be in 1..={cap}, got {length}"
            )));
        }
        Ok(VarFormat {
            kind,
            length,
            payload: None,
            len_header: None,
            len_counts: None,
        })
    }

    pub fn llvar(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LlVar, length)
    }
    pub fn llvar_n(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LlVarN, length)
    }
    pub fn llvar_an(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LlVarAn, length)
    }
    pub fn llvar_ans(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LlVarAns, length)
    }
    pub fn lllvar(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LllVar, length)
    }
    pub fn lllvar_n(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LllVarN, length)
    }
    pub fn lllvar_an(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LllVarAn, length)
    }
    pub fn lllvar_ans(length: usize) -> Result<Self, CodecError> {
        Self::new(Kind::LllVarAns, length)
    }

    /// Override the payload encoding (defaults per [`apply_var_defaults`]).
    pub fn with_payload(mut self, payload: VarPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Override the length-header encoding (default BCD).
    pub fn with_len_header(mut self, enc: LenHeaderEncoding) -> Self {
        self.len_header = Some(enc);
        self
    }

    /// Override what the length header counts (defaults per [`apply_var_defaults`]).
    pub fn with_len_counts(mut self, mode: LenCountMode) -> Self {
        self.len_counts = Some(mode);
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Maximum logical length (bytes or digits, per count mode).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Header digit width: 2 for LL kinds, 3 for LLL kinds, irrespective of
    /// the count mode.
    pub fn header_digits(&self) -> usize {
        match self.kind {
            Kind::LllVar | Kind::LllVarN | Kind::LllVarAn | Kind::LllVarAns => 3,
            _ => 2,
        }
    }

    fn is_numeric_subtype(&self) -> bool {
        matches!(self.kind, Kind::LlVarN | Kind::LllVarN)
    }
}

/// Fully-resolved variable-length settings after defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVar {
    pub payload: VarPayload,
    pub len_header: LenHeaderEncoding,
    pub len_counts: LenCountMode,
}

/// Resolve the optional settings of a variable-length format.
///
/// Numeric subtypes (LLVARn/LLLVARn) default to a BCD-digits payload counted
/// in digits; all others to an ASCII payload counted in bytes. The length
/// header always defaults to BCD. A digits count mode on a non-numeric
/// subtype is rejected.
pub fn apply_var_defaults(de: u8, f: &VarFormat) -> Result<ResolvedVar, CodecError> {
    let numeric = f.is_numeric_subtype();
    let payload = f.payload.unwrap_or(if numeric {
        VarPayload::BcdDigits
    } else {
        VarPayload::Ascii
    });
    let len_header = f.len_header.unwrap_or_default();
    let len_counts = f.len_counts.unwrap_or(if numeric {
        LenCountMode::Digits
    } else {
        LenCountMode::Bytes
    });
    if len_counts == LenCountMode::Digits && !numeric {
        return Err(CodecError::Spec(format!(
            "DE {de}: digit count mode requires a numeric variable-length kind, got {}",
            f.kind
        )));
    }
    Ok(ResolvedVar {
        payload,
        len_header,
        len_counts,
    })
}

/// A field's wire shape: the tagged union the per-field codecs dispatch on.
///
/// The constructors validate length bounds; prefer them over building
/// variants directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFormat {
    Numeric { length: usize, encoding: NumericEncoding },
    Alpha { length: usize },
    AlphaNumeric { length: usize },
    AlphaNumericSpecial { length: usize },
    Binary { length: usize },
    Bitmap { length: usize },
    Var(VarFormat),
}

fn require_positive(kind: Kind, length: usize) -> Result<(), CodecError> {
    if length == 0 {
        Err(CodecError::Spec(format!("{kind} length must be positive")))
    } else {
        Ok(())
    }
}

impl FieldFormat {
    /// Numeric field of `length` digits, BCD encoded.
    pub fn numeric(length: usize) -> Result<Self, CodecError> {
        Self::numeric_with(length, NumericEncoding::default())
    }

    /// Numeric field of `length` digits with an explicit wire encoding.
    pub fn numeric_with(length: usize, encoding: NumericEncoding) -> Result<Self, CodecError> {
        require_positive(Kind::Numeric, length)?;
        Ok(FieldFormat::Numeric { length, encoding })
    }

    /// Letters-only field of `length` characters, space padded.
    pub fn alpha(length: usize) -> Result<Self, CodecError> {
        require_positive(Kind::Alpha, length)?;
        Ok(FieldFormat::Alpha { length })
    }

    /// Letters-and-digits field of `length` characters, space padded.
    pub fn alphanumeric(length: usize) -> Result<Self, CodecError> {
        require_positive(Kind::AlphaNumeric, length)?;
        Ok(FieldFormat::AlphaNumeric { length })
    }

    /// Printable-ASCII field of `length` characters, space padded.
    pub fn alphanumeric_special(length: usize) -> Result<Self, CodecError> {
        require_positive(Kind::AlphaNumericSpecial, length)?;
        Ok(FieldFormat::AlphaNumericSpecial { length })
    }

    /// Raw binary field of exactly `length` bytes.
    pub fn binary(length: usize) -> Result<Self, CodecError> {
        require_positive(Kind::Binary, length)?;
        Ok(FieldFormat::Binary { length })
    }

    /// Bitmap field: 8 bytes (64-bit-only) or 16 bytes (128-bit-capable).
    pub fn bitmap(length: usize) -> Result<Self, CodecError> {
        if length != 8 && length != 16 {
            return Err(CodecError::Spec(format!(
                "bitmap length must be 8 or 16, got {length}"
            )));
        }
        Ok(FieldFormat::Bitmap { length })
    }

    pub fn llvar(length: usize) -> Result<Self, CodecError> {
        VarFormat::llvar(length).map(FieldFormat::Var)
    }
    pub fn llvar_n(length: usize) -> Result<Self, CodecError> {
        VarFormat::llvar_n(length).map(FieldFormat::Var)
    }
    pub fn llvar_an(length: usize) -> Result<Self, CodecError> {
        VarFormat::llvar_an(length).map(FieldFormat::Var)
    }
    pub fn llvar_ans(length: usize) -> Result<Self, CodecError> {
        VarFormat::llvar_ans(length).map(FieldFormat::Var)
    }
    pub fn lllvar(length: usize) -> Result<Self, CodecError> {
        VarFormat::lllvar(length).map(FieldFormat::Var)
    }
    pub fn lllvar_n(length: usize) -> Result<Self, CodecError> {
        VarFormat::lllvar_n(length).map(FieldFormat::Var)
    }
    pub fn lllvar_an(length: usize) -> Result<Self, CodecError> {
        VarFormat::lllvar_an(length).map(FieldFormat::Var)
    }
    pub fn lllvar_ans(length: usize) -> Result<Self, CodecError> {
        VarFormat::lllvar_ans(length).map(FieldFormat::Var)
    }

    pub fn kind(&self) -> Kind {
        match self {
            FieldFormat::Numeric { .. } => Kind::Numeric,
            FieldFormat::Alpha { .. } => Kind::Alpha,
            FieldFormat::AlphaNumeric { .. } => Kind::AlphaNumeric,
            FieldFormat::AlphaNumericSpecial { .. } => Kind::AlphaNumericSpecial,
            FieldFormat::Binary { .. } => Kind::Binary,
            FieldFormat::Bitmap { .. } => Kind::Bitmap,
            FieldFormat::Var(f) => f.kind(),
        }
    }

    /// Declared length: digits, characters, or bytes for fixed formats; the
    /// maximum logical length for variable-length formats.
    pub fn length(&self) -> usize {
        match self {
            FieldFormat::Numeric { length, .. }
            | FieldFormat::Alpha { length }
            | FieldFormat::AlphaNumeric { length }
            | FieldFormat::AlphaNumericSpecial { length }
            | FieldFormat::Binary { length }
            | FieldFormat::Bitmap { length } => *length,
            FieldFormat::Var(f) => f.length(),
        }
    }
}

impl From<VarFormat> for FieldFormat {
    fn from(f: VarFormat) -> Self {
        FieldFormat::Var(f)
    }
}
