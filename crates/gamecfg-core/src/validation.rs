//! Advisory validation of setting values
//!
//! Validation never mutates and never fails: it returns every problem it finds
//! so the caller can show them all at once and decide whether to block a save.

use serde::Serialize;

use crate::catalog::SettingDefinition;
use crate::error::Error;
use crate::value::{decode, TypedValue};

/// A single non-fatal problem with a setting value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub setting: String,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IssueKind {
    /// Numeric value outside the declared `[min, max]`
    OutOfRange {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// String value not matching the declared pattern
    PatternMismatch { value: String, pattern: String },
    /// Enum value not among the declared options
    UnknownOption { value: String, options: Vec<String> },
    /// Raw value that cannot be read as the declared type
    Unparseable { raw: String, expected: String },
}

impl ValidationIssue {
    pub fn new(setting: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            setting: setting.into(),
            kind,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = &self.setting;
        match &self.kind {
            IssueKind::OutOfRange { value, min, max } => match (min, max) {
                (Some(min), Some(max)) => write!(
                    f,
                    "'{}' must be between {} and {} (got {})",
                    name, min, max, value
                ),
                (Some(min), None) => write!(f, "'{}' must be at least {} (got {})", name, min, value),
                (None, Some(max)) => write!(f, "'{}' must be at most {} (got {})", name, max, value),
                (None, None) => write!(f, "'{}' is out of range (got {})", name, value),
            },
            IssueKind::PatternMismatch { value, .. } => {
                write!(f, "'{}' does not match the required pattern (got {:?})", name, value)
            }
            IssueKind::UnknownOption { value, options } => write!(
                f,
                "'{}' must be one of {} (got {:?})",
                name,
                options.join(", "),
                value
            ),
            IssueKind::Unparseable { raw, expected } => {
                write!(f, "'{}' must be a valid {} (got {:?})", name, expected, raw)
            }
        }
    }
}

/// Check a typed value against its definition
pub fn validate(value: &TypedValue, def: &SettingDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    (def.kind.strategy().validate)(value, def, &mut issues);
    issues
}

/// Check a raw value, reporting decode failures as issues rather than errors
pub fn validate_raw(raw: &str, def: &SettingDefinition) -> Vec<ValidationIssue> {
    match decode(raw, def) {
        Ok(value) => validate(&value, def),
        Err(Error::Coercion { raw, expected, .. }) => vec![ValidationIssue::new(
            &def.name,
            IssueKind::Unparseable {
                raw,
                expected: expected.to_string(),
            },
        )],
        Err(other) => {
            tracing::warn!("Unexpected error validating '{}': {}", def.name, other);
            Vec::new()
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Per-type checks (wired into the strategy table in `value`)
// ─────────────────────────────────────────────────────────────────

pub(crate) fn check_nothing(
    _value: &TypedValue,
    _def: &SettingDefinition,
    _issues: &mut Vec<ValidationIssue>,
) {
}

pub(crate) fn check_bounds(
    value: &TypedValue,
    def: &SettingDefinition,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(v) = value.as_f64() else {
        return;
    };

    // NaN compares false against both bounds
    let below = def.min.is_some_and(|min| v < min);
    let above = def.max.is_some_and(|max| v > max);
    if below || above || !v.is_finite() {
        issues.push(ValidationIssue::new(
            &def.name,
            IssueKind::OutOfRange {
                value: v,
                min: def.min,
                max: def.max,
            },
        ));
    }
}

pub(crate) fn check_pattern(
    value: &TypedValue,
    def: &SettingDefinition,
    issues: &mut Vec<ValidationIssue>,
) {
    let (Some(pattern), TypedValue::Str(s)) = (&def.pattern, value) else {
        return;
    };

    if !pattern.is_match(s) {
        issues.push(ValidationIssue::new(
            &def.name,
            IssueKind::PatternMismatch {
                value: s.clone(),
                pattern: pattern.as_str().to_string(),
            },
        ));
    }
}

pub(crate) fn check_options(
    value: &TypedValue,
    def: &SettingDefinition,
    issues: &mut Vec<ValidationIssue>,
) {
    let (TypedValue::Enum(s) | TypedValue::Str(s)) = value else {
        return;
    };

    if !def.options.iter().any(|o| o == s) {
        issues.push(ValidationIssue::new(
            &def.name,
            IssueKind::UnknownOption {
                value: s.clone(),
                options: def.options.clone(),
            },
        ));
    }
}
