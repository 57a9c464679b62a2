//! Decoded cell values.

use serde::{Serialize, Serializer};
use std::fmt;

/// Unit attached to an amount by its number format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Percent,
    Eur,
    Frf,
}

impl Unit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Eur => "EUR",
            Unit::Frf => "FRF",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A number, kept integral when the stored float is exactly integral
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Truncate exactly integral floats to integers.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Number::Int(value as i64)
        } else {
            Number::Float(value)
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Int(i) => serializer.serialize_i64(*i),
            Number::Float(x) => serializer.serialize_f64(*x),
        }
    }
}

/// Typed semantic value of a cell.
///
/// An [`Amount`](DecodedValue::Amount) only ever comes from a numeric cell
/// whose number format names a currency or a percentage.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Null,
    Text(String),
    Number(Number),
    Amount { value: Number, unit: Unit },
    /// ISO 8601 date, date-time or time-of-day
    Date(String),
    Boolean(bool),
    /// Symbolic error name, e.g. `#DIV/0!`
    Error(&'static str),
}

impl DecodedValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, DecodedValue::Null)
    }

    /// Null or an empty string
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            DecodedValue::Null => true,
            DecodedValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String content of text and date values
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(s) | DecodedValue::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, used in diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedValue::Null => "null",
            DecodedValue::Text(_) => "text",
            DecodedValue::Number(_) => "number",
            DecodedValue::Amount { .. } => "amount",
            DecodedValue::Date(_) => "date",
            DecodedValue::Boolean(_) => "boolean",
            DecodedValue::Error(_) => "error",
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Null => Ok(()),
            DecodedValue::Text(s) | DecodedValue::Date(s) => f.write_str(s),
            DecodedValue::Number(n) => write!(f, "{n}"),
            DecodedValue::Amount { value, unit } => write!(f, "{value} {unit}"),
            DecodedValue::Boolean(b) => write!(f, "{b}"),
            DecodedValue::Error(name) => f.write_str(name),
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Null => serializer.serialize_unit(),
            DecodedValue::Number(n) => n.serialize(serializer),
            DecodedValue::Boolean(b) => serializer.serialize_bool(*b),
            // Amounts become "<value> <unit>" strings.
            other => serializer.collect_str(other),
        }
    }
}
