//! # Serialization Codec helpers
//!
//! Field access for JSON decoders and the numeric conventions shared by the
//! JSON and DOM encodings.

use crate::errors::CodecError;
use serde_json::{Map, Number, Value};
use tracing::warn;

/// Typed view over one node's JSON object
pub struct JsonFields<'a> {
    type_tag: &'a str,
    map: &'a Map<String, Value>,
}

impl<'a> JsonFields<'a> {
    pub fn new(type_tag: &'a str, map: &'a Map<String, Value>) -> Self {
        Self { type_tag, map }
    }

    pub fn type_tag(&self) -> &str {
        self.type_tag
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name)
    }

    pub fn string(&self, name: &str) -> Result<String, CodecError> {
        match self.map.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.malformed(name, format!("expected string, found {}", other))),
            None => Err(self.malformed(name, "missing")),
        }
    }

    /// Absent and `null` both read as `None`
    pub fn optional_string(&self, name: &str) -> Result<Option<String>, CodecError> {
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.malformed(name, format!("expected string or null, found {}", other))),
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> Result<String, CodecError> {
        Ok(self.optional_string(name)?.unwrap_or_else(|| default.to_string()))
    }

    /// A finite number
    pub fn number(&self, name: &str) -> Result<f64, CodecError> {
        match self.map.get(name) {
            Some(Value::Number(n)) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| self.malformed(name, "not a finite number")),
            Some(other) => Err(self.malformed(name, format!("expected number, found {}", other))),
            None => Err(self.malformed(name, "missing")),
        }
    }

    pub fn u32_or(&self, name: &str, default: u32) -> Result<u32, CodecError> {
        match self.map.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| self.malformed(name, "expected unsigned 32-bit integer")),
            Some(other) => Err(self.malformed(name, format!("expected integer, found {}", other))),
        }
    }

    pub fn array(&self, name: &str) -> Result<&'a Vec<Value>, CodecError> {
        match self.map.get(name) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(self.malformed(name, format!("expected array, found {}", other))),
            None => Err(self.malformed(name, "missing")),
        }
    }

    pub fn object(&self, name: &str) -> Result<&'a Map<String, Value>, CodecError> {
        match self.map.get(name) {
            Some(Value::Object(map)) => Ok(map),
            Some(other) => Err(self.malformed(name, format!("expected object, found {}", other))),
            None => Err(self.malformed(name, "missing")),
        }
    }

    pub fn malformed(&self, field: &str, reason: impl Into<String>) -> CodecError {
        CodecError::malformed(self.type_tag, field, reason)
    }
}

/// Read `type` and `version` from a serialized node
pub fn read_header(map: &Map<String, Value>) -> Result<(String, u64), CodecError> {
    let type_tag = match map.get("type") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(CodecError::malformed("?", "type", "missing or not a string")),
    };
    let version = map
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| CodecError::malformed(&type_tag, "version", "missing or not an integer"))?;
    Ok((type_tag, version))
}

/// Amounts are always finite; NaN and infinities become 0
pub fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() {
        amount
    } else {
        warn!(amount, "Non-finite amount replaced with 0");
        0.0
    }
}

/// Integral amounts serialize as JSON integers (`120`, not `120.0`)
pub fn json_number(value: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    let value = finite_or_zero(value);
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Value::from(value as i64)
    } else {
        match Number::from_f64(value) {
            Some(number) => Value::Number(number),
            None => Value::from(0),
        }
    }
}

/// Amounts cross the DOM boundary as decimal strings
pub fn format_amount(value: f64) -> String {
    format!("{}", value)
}

/// Parse a decimal amount attribute, falling back to `fallback` when absent or malformed
pub fn parse_amount(raw: Option<&str>, fallback: f64) -> f64 {
    let Some(raw) = raw else {
        return fallback;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!(value = %raw, fallback, "Malformed amount attribute - using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_number_integral() {
        assert_eq!(json_number(120.0), json!(120));
        assert_eq!(json_number(-3.0), json!(-3));
        assert_eq!(json_number(12.5), json!(12.5));
    }

    #[test]
    fn test_json_number_never_null() {
        assert_eq!(json_number(f64::NAN), json!(0));
        assert_eq!(json_number(f64::INFINITY), json!(0));
        assert_eq!(json_number(-1e300), json!(-1e300));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(120.0), "120");
        assert_eq!(format_amount(99.95), "99.95");
    }

    #[test]
    fn test_parse_amount_fallbacks() {
        assert_eq!(parse_amount(Some("120"), 0.0), 120.0);
        assert_eq!(parse_amount(Some(" 7.5 "), 0.0), 7.5);
        assert_eq!(parse_amount(Some("NaN"), 0.0), 0.0);
        assert_eq!(parse_amount(Some("inf"), 1.0), 1.0);
        assert_eq!(parse_amount(Some("12abc"), 0.0), 0.0);
        assert_eq!(parse_amount(None, 5.0), 5.0);
    }

    #[test]
    fn test_fields_reject_wrong_types() {
        let value = json!({"amount": "120", "currency": 5});
        let map = value.as_object().unwrap();
        let fields = JsonFields::new("budgetlink", map);

        assert!(matches!(
            fields.number("amount"),
            Err(CodecError::MalformedField { ref field, .. }) if field == "amount"
        ));
        assert!(fields.string("currency").is_err());
        assert!(fields.string("category").is_err());
        assert_eq!(fields.optional_string("category").unwrap(), None);
    }

    #[test]
    fn test_read_header() {
        let value = json!({"type": "poll", "version": 1});
        assert_eq!(
            read_header(value.as_object().unwrap()).unwrap(),
            ("poll".to_string(), 1)
        );

        let value = json!({"type": "poll"});
        assert!(read_header(value.as_object().unwrap()).is_err());
    }
}
