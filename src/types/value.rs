//! Telemetry value type and raw-field coercion.

use serde::{Deserialize, Serialize};

use crate::{LinkError, Result};

/// Runtime value type for one telemetry field.
///
/// The simulator reply carries every field as text; each field is coerced
/// into exactly one of these kinds when the reply is decoded, never at read
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryValue {
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Kind discriminant for [`TelemetryValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Bool,
    Text,
}

impl TelemetryValue {
    /// Coerce one raw reply field into a typed value.
    ///
    /// The numeric test is syntactic: the text must consist of digits, `.`
    /// and `-` only, with at least one digit. Text that passes the test but
    /// is not a valid decimal (`"1.2.3"`, `"--1"`) is a hard error for the
    /// field rather than silently falling back to [`TelemetryValue::Text`].
    /// Decimal point only; no locale-sensitive parsing.
    pub fn coerce(tag: &str, raw: &str) -> Result<Self> {
        if looks_numeric(raw) {
            return raw
                .parse::<f64>()
                .map(TelemetryValue::Float)
                .map_err(|_| LinkError::coercion(tag, raw));
        }
        match raw {
            "true" => Ok(TelemetryValue::Bool(true)),
            "false" => Ok(TelemetryValue::Bool(false)),
            _ => Ok(TelemetryValue::Text(raw.to_owned())),
        }
    }

    /// Kind discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            TelemetryValue::Float(_) => ValueKind::Float,
            TelemetryValue::Bool(_) => ValueKind::Bool,
            TelemetryValue::Text(_) => ValueKind::Text,
        }
    }

    /// Numeric view of this value, if it is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TelemetryValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean view of this value, if it is a flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TelemetryValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of this value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TelemetryValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Syntactic numeric test: digits, `.` and `-` only, at least one digit.
fn looks_numeric(raw: &str) -> bool {
    let mut saw_digit = false;
    if raw.is_empty() {
        return false;
    }
    for ch in raw.chars() {
        match ch {
            '0'..='9' => saw_digit = true,
            '.' | '-' => {}
            _ => return false,
        }
    }
    saw_digit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_integers_and_decimals() {
        assert_eq!(TelemetryValue::coerce("t", "1000").unwrap(), TelemetryValue::Float(1000.0));
        assert_eq!(TelemetryValue::coerce("t", "-0.5").unwrap(), TelemetryValue::Float(-0.5));
        assert_eq!(TelemetryValue::coerce("t", "0.0000").unwrap(), TelemetryValue::Float(0.0));
    }

    #[test]
    fn coerces_flags() {
        assert_eq!(TelemetryValue::coerce("t", "true").unwrap(), TelemetryValue::Bool(true));
        assert_eq!(TelemetryValue::coerce("t", "false").unwrap(), TelemetryValue::Bool(false));
    }

    #[test]
    fn passes_status_strings_through() {
        let value = TelemetryValue::coerce("m-currentAircraftStatus", "CAS-FLYING").unwrap();
        assert_eq!(value, TelemetryValue::Text("CAS-FLYING".to_string()));
        assert_eq!(value.as_str(), Some("CAS-FLYING"));
    }

    #[test]
    fn numeric_looking_garbage_is_a_hard_error() {
        // These pass the character test, so they must not silently become text.
        for raw in ["1.2.3", "--1", "1-2", "5..5"] {
            let err = TelemetryValue::coerce("m-airspeed-MPS", raw).unwrap_err();
            assert!(matches!(err, LinkError::Coercion { .. }), "{raw} should fail coercion");
        }
    }

    #[test]
    fn dots_and_dashes_without_digits_are_text() {
        // The original character test requires at least one digit.
        assert_eq!(TelemetryValue::coerce("t", "-").unwrap(), TelemetryValue::Text("-".into()));
        assert_eq!(TelemetryValue::coerce("t", "...").unwrap(), TelemetryValue::Text("...".into()));
        assert_eq!(TelemetryValue::coerce("t", "").unwrap(), TelemetryValue::Text(String::new()));
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(TelemetryValue::Float(1.0).kind(), ValueKind::Float);
        assert_eq!(TelemetryValue::Bool(false).kind(), ValueKind::Bool);
        assert_eq!(TelemetryValue::Text("x".into()).kind(), ValueKind::Text);
    }
}
