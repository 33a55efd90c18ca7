//! Descriptor-driven forms.
//!
//! Every editable record declares an ordered, exhaustive list of
//! [`FieldDescriptor`]s. Rendering, editing and validation all walk that
//! list, so adding a field to a record means adding one descriptor and the
//! form follows.
//!
//! Edits arrive as raw text (whatever the user typed) and are coerced by the
//! field's [`FieldKind`]: dates stay strings, numeric kinds become numbers,
//! text is kept verbatim.

mod records;

use chrono::NaiveDate;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// ISO calendar date, `YYYY-MM-DD`.
    Date,
    /// Whole number.
    Integer,
    /// Any finite number.
    Number,
    Text,
}

/// Kind of input control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Date,
    Number,
    Text,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Number => "number",
            Self::Text => "text",
        }
    }
}

impl FieldKind {
    pub fn input_type(&self) -> InputType {
        match self {
            Self::Date => InputType::Date,
            Self::Integer | Self::Number => InputType::Number,
            Self::Text => InputType::Text,
        }
    }

    /// Coerce raw input for `field` into a stored value.
    pub fn coerce(&self, field: &str, raw: &str) -> Result<FieldValue, FormError> {
        match self {
            Self::Text => Ok(FieldValue::Text(raw.to_string())),
            Self::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(|date| FieldValue::Text(date.format("%Y-%m-%d").to_string()))
                .map_err(|_| FormError::NotADate {
                    field: field.to_string(),
                    raw: raw.to_string(),
                }),
            Self::Number | Self::Integer => {
                let number = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| FormError::NotANumber {
                        field: field.to_string(),
                        raw: raw.to_string(),
                    })?;
                if *self == Self::Integer && number.fract() != 0.0 {
                    return Err(FormError::NotWhole {
                        field: field.to_string(),
                        raw: raw.to_string(),
                    });
                }
                Ok(FieldValue::Number(number))
            }
        }
    }
}

/// Accepted values of a field. Numeric ranges may be open at either end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Unbounded,
    Range {
        min: f64,
        max: f64,
        min_inclusive: bool,
        max_inclusive: bool,
    },
    /// Length in characters, after trimming.
    Length { min: usize, max: usize },
}

impl Bounds {
    pub const fn inclusive(min: f64, max: f64) -> Self {
        Self::Range {
            min,
            max,
            min_inclusive: true,
            max_inclusive: true,
        }
    }

    pub const fn exclusive(min: f64, max: f64) -> Self {
        Self::Range {
            min,
            max,
            min_inclusive: false,
            max_inclusive: false,
        }
    }

    pub const fn chars(min: usize, max: usize) -> Self {
        Self::Length { min, max }
    }

    /// Check a stored value, returning the reason it is rejected.
    pub fn check(&self, value: &FieldValue) -> Result<(), String> {
        match (self, value) {
            (Self::Unbounded, _) => Ok(()),
            (
                Self::Range {
                    min,
                    max,
                    min_inclusive,
                    max_inclusive,
                },
                FieldValue::Number(n),
            ) => {
                let above = if *min_inclusive { *n >= *min } else { *n > *min };
                let below = if *max_inclusive { *n <= *max } else { *n < *max };
                if above && below {
                    Ok(())
                } else {
                    let open = if *min_inclusive { '[' } else { '(' };
                    let close = if *max_inclusive { ']' } else { ')' };
                    Err(format!("{n} is outside {open}{min}, {max}{close}"))
                }
            }
            (Self::Length { min, max }, FieldValue::Text(s)) => {
                let len = s.trim().chars().count();
                if (*min..=*max).contains(&len) {
                    Ok(())
                } else {
                    Err(format!("must be {min}-{max} characters (got {len})"))
                }
            }
            _ => Ok(()),
        }
    }
}

/// One field of an editable record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Wire name of the field.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub bounds: Bounds,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            bounds: Bounds::Unbounded,
        }
    }

    pub const fn bounded(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }
}

// ---------------------------------------------------------------------------
// Values and errors
// ---------------------------------------------------------------------------

/// A coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("{field}: '{raw}' is not a number")]
    NotANumber { field: String, raw: String },

    #[error("{field}: '{raw}' is not a whole number")]
    NotWhole { field: String, raw: String },

    #[error("{field}: '{raw}' is not a date (expected YYYY-MM-DD)")]
    NotADate { field: String, raw: String },

    #[error("{field}: {reason}")]
    OutOfBounds { field: String, reason: String },

    #[error("exercise names must be unique per session ('{0}' repeats)")]
    DuplicateExercise(String),

    #[error("a session needs at least one exercise")]
    NoExercises,

    #[error("no exercise row {0}")]
    NoSuchRow(usize),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A record that can be rendered and edited field by field.
pub trait FormRecord {
    /// Ordered, exhaustive field list.
    fn fields() -> &'static [FieldDescriptor];

    /// Current value of a field, `None` for unknown names.
    fn value(&self, name: &str) -> Option<FieldValue>;

    /// Store an already coerced value.
    fn store(&mut self, name: &str, value: FieldValue) -> Result<(), FormError>;
}

/// One rendered input control.
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: InputType,
    pub value: String,
}

pub fn descriptor<R: FormRecord>(name: &str) -> Option<&'static FieldDescriptor> {
    R::fields().iter().find(|field| field.name == name)
}

/// One input per declared field, in declaration order.
pub fn render_form<R: FormRecord>(record: &R) -> Vec<FormInput> {
    R::fields()
        .iter()
        .map(|field| FormInput {
            name: field.name,
            label: field.label,
            input_type: field.kind.input_type(),
            value: record
                .value(field.name)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// Write raw input back into `record` by field name.
pub fn apply_edit<R: FormRecord>(record: &mut R, name: &str, raw: &str) -> Result<(), FormError> {
    let field = descriptor::<R>(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
    let value = field.kind.coerce(field.name, raw)?;
    record.store(field.name, value)
}

/// Check every field against its bounds. Field names in the returned errors
/// are prefixed with `prefix` when it is not empty.
pub fn validate_record<R: FormRecord>(record: &R, prefix: &str) -> Vec<FormError> {
    R::fields()
        .iter()
        .filter_map(|field| {
            let value = record.value(field.name)?;
            let reason = field.bounds.check(&value).err()?;
            let name = if prefix.is_empty() {
                field.name.to_string()
            } else {
                format!("{prefix}.{}", field.name)
            };
            Some(FormError::OutOfBounds { field: name, reason })
        })
        .collect()
}

/// Convert a coerced number into a `u32` field.
pub(crate) fn whole(field: &str, value: &FieldValue) -> Result<u32, FormError> {
    let n = number(field, value)?;
    if n < 0.0 || n > f64::from(u32::MAX) || n.fract() != 0.0 {
        return Err(FormError::OutOfBounds {
            field: field.to_string(),
            reason: format!("{n} is not a non-negative whole number"),
        });
    }
    Ok(n as u32)
}

pub(crate) fn number(field: &str, value: &FieldValue) -> Result<f64, FormError> {
    value.as_f64().ok_or_else(|| FormError::NotANumber {
        field: field.to_string(),
        raw: value.to_string(),
    })
}

pub(crate) fn text(field: &str, value: FieldValue) -> Result<String, FormError> {
    match value {
        FieldValue::Text(s) => Ok(s),
        FieldValue::Number(n) => Err(FormError::OutOfBounds {
            field: field.to_string(),
            reason: format!("expected text, got {n}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
