//! Typed values and raw string coercion
//!
//! Raw strings are the persisted form of every setting. A [`TypedValue`] is
//! the transient, presentation-ready view derived from a raw string and its
//! [`SettingDefinition`]. Conversion in both directions goes through a static
//! strategy table keyed by [`SettingType`].

use indexmap::IndexMap;

use crate::catalog::{SettingDefinition, SettingType};
use crate::prelude::*;
use crate::validation::{self, ValidationIssue};

/// Setting name → raw string value, in insertion order
pub type RawSettings = IndexMap<String, String>;

/// Raw strings that decode to `true` for bool settings (case-insensitive)
const TRUE_WORDS: &[&str] = &["true", "yes", "1"];

/// Fixed precision used when writing float settings
pub const FLOAT_PRECISION: usize = 6;

/// Runtime representation of a setting value
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// The selected option of an enum setting
    Enum(String),
}

impl TypedValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Bool(_) => "bool",
            TypedValue::Int(_) => "int",
            TypedValue::Float(_) => "float",
            TypedValue::Str(_) => "string",
            TypedValue::Enum(_) => "enum",
        }
    }

    /// Numeric view used for bounds checks
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Int(i) => Some(*i as f64),
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Int(i) => write!(f, "{}", i),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Str(s) | TypedValue::Enum(s) => f.write_str(s),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Quoting helpers
// ─────────────────────────────────────────────────────────────────

/// True when the value is wrapped in a matching pair of double quotes
pub fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// Strip exactly one layer of surrounding double quotes
pub fn unquote(value: &str) -> &str {
    if is_quoted(value) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Wrap in double quotes unless already quoted
pub fn quote(value: &str) -> String {
    if is_quoted(value) {
        value.to_string()
    } else {
        format!("\"{}\"", value)
    }
}

// ─────────────────────────────────────────────────────────────────
// Strategy table
// ─────────────────────────────────────────────────────────────────

type DecodeFn = fn(&str, &SettingDefinition) -> Result<TypedValue>;
type EncodeFn = fn(&TypedValue, &SettingDefinition) -> Result<String>;
type ValidateFn = fn(&TypedValue, &SettingDefinition, &mut Vec<ValidationIssue>);

/// Decode/encode/validate behaviour for one setting type
pub struct TypeStrategy {
    pub decode: DecodeFn,
    pub encode: EncodeFn,
    pub validate: ValidateFn,
}

static BOOL_STRATEGY: TypeStrategy = TypeStrategy {
    decode: decode_bool,
    encode: encode_bool,
    validate: validation::check_nothing,
};

static INT_STRATEGY: TypeStrategy = TypeStrategy {
    decode: decode_int,
    encode: encode_int,
    validate: validation::check_bounds,
};

static FLOAT_STRATEGY: TypeStrategy = TypeStrategy {
    decode: decode_float,
    encode: encode_float,
    validate: validation::check_bounds,
};

static STRING_STRATEGY: TypeStrategy = TypeStrategy {
    decode: decode_string,
    encode: encode_string,
    validate: validation::check_pattern,
};

static ENUM_STRATEGY: TypeStrategy = TypeStrategy {
    decode: decode_enum,
    encode: encode_enum,
    validate: validation::check_options,
};

impl SettingType {
    pub fn strategy(&self) -> &'static TypeStrategy {
        match self {
            SettingType::Bool => &BOOL_STRATEGY,
            SettingType::Int => &INT_STRATEGY,
            SettingType::Float => &FLOAT_STRATEGY,
            SettingType::String => &STRING_STRATEGY,
            SettingType::Enum => &ENUM_STRATEGY,
        }
    }
}

/// Convert a raw string to its typed value according to `def`
pub fn decode(raw: &str, def: &SettingDefinition) -> Result<TypedValue> {
    (def.kind.strategy().decode)(raw, def)
}

/// Convert a typed value to the string written into the OptionSettings block
///
/// String settings come back quoted; everything else is bare.
pub fn encode(value: &TypedValue, def: &SettingDefinition) -> Result<String> {
    (def.kind.strategy().encode)(value, def)
}

/// The unquoted form stored in a settings document
pub fn canonical_raw(value: &TypedValue, def: &SettingDefinition) -> Result<String> {
    let encoded = encode(value, def)?;
    Ok(unquote(&encoded).to_string())
}

/// Re-encode a raw string in its canonical wire form, e.g. `1` → `True`
pub fn normalize(raw: &str, def: &SettingDefinition) -> Result<String> {
    encode(&decode(raw, def)?, def)
}

fn mismatch(value: &TypedValue, def: &SettingDefinition) -> Error {
    Error::coercion(&def.name, value.to_string(), def.kind.type_name())
}

fn decode_bool(raw: &str, _def: &SettingDefinition) -> Result<TypedValue> {
    let raw = raw.trim();
    Ok(TypedValue::Bool(
        TRUE_WORDS.iter().any(|w| raw.eq_ignore_ascii_case(w)),
    ))
}

fn encode_bool(value: &TypedValue, def: &SettingDefinition) -> Result<String> {
    match value {
        TypedValue::Bool(true) => Ok("True".to_string()),
        TypedValue::Bool(false) => Ok("False".to_string()),
        other => Err(mismatch(other, def)),
    }
}

fn decode_int(raw: &str, def: &SettingDefinition) -> Result<TypedValue> {
    raw.trim()
        .parse::<i64>()
        .map(TypedValue::Int)
        .map_err(|_| Error::coercion(&def.name, raw, "int"))
}

fn encode_int(value: &TypedValue, def: &SettingDefinition) -> Result<String> {
    match value {
        TypedValue::Int(i) => Ok(i.to_string()),
        // Spin boxes hand back floats; accept them when they are whole numbers
        TypedValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok((*f as i64).to_string()),
        other => Err(mismatch(other, def)),
    }
}

fn decode_float(raw: &str, def: &SettingDefinition) -> Result<TypedValue> {
    // `parse` accepts "NaN" and "inf", which the game cannot read back
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(TypedValue::Float)
        .ok_or_else(|| Error::coercion(&def.name, raw, "float"))
}

fn encode_float(value: &TypedValue, def: &SettingDefinition) -> Result<String> {
    let v = match value {
        TypedValue::Float(f) if f.is_finite() => *f,
        TypedValue::Int(i) => *i as f64,
        other => return Err(mismatch(other, def)),
    };
    Ok(format!("{:.*}", FLOAT_PRECISION, v))
}

fn decode_string(raw: &str, _def: &SettingDefinition) -> Result<TypedValue> {
    Ok(TypedValue::Str(unquote(raw).to_string()))
}

fn encode_string(value: &TypedValue, def: &SettingDefinition) -> Result<String> {
    match value {
        TypedValue::Str(s) | TypedValue::Enum(s) => Ok(quote(s)),
        other => Err(mismatch(other, def)),
    }
}

fn decode_enum(raw: &str, _def: &SettingDefinition) -> Result<TypedValue> {
    // Membership is a validation concern; keep unknown values for round-tripping
    Ok(TypedValue::Enum(raw.to_string()))
}

fn encode_enum(value: &TypedValue, def: &SettingDefinition) -> Result<String> {
    match value {
        TypedValue::Enum(s) | TypedValue::Str(s) => Ok(s.clone()),
        other => Err(mismatch(other, def)),
    }
}
