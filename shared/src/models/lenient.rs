//! Tolerant scalar decoding
//!
//! Tabular data went through several writers over time; the same column can
//! hold `"12"`, `12`, `12.0` or `null`. These helpers read any JSON scalar as
//! text so a record never fails to decode over a cell type.

use serde::de::{self, Deserializer, Visitor};
use serde_json::Value;
use std::fmt;

struct ScalarText;

impl<'de> Visitor<'de> for ScalarText {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(float_text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

/// `deserialize_with` target: any scalar as text, null as empty
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarText)
}

/// Float text keeping a trailing `.0` for whole numbers (`12.0`, not `12`)
pub fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// Text form of an already-parsed JSON value
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => float_text(f),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Numeric reading of a JSON value; non-numeric text is `None`
pub fn value_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Cell {
        #[serde(deserialize_with = "string")]
        v: String,
    }

    fn read(value: Value) -> String {
        serde_json::from_value::<Cell>(json!({ "v": value })).unwrap().v
    }

    #[test]
    fn test_scalars_read_as_text() {
        assert_eq!(read(json!("abc")), "abc");
        assert_eq!(read(json!(42)), "42");
        assert_eq!(read(json!(12.5)), "12.5");
        assert_eq!(read(json!(12.0)), "12.0");
        assert_eq!(read(json!(true)), "true");
        assert_eq!(read(Value::Null), "");
    }

    #[test]
    fn test_value_helpers() {
        assert_eq!(value_text(&json!(3.0)), "3.0");
        assert_eq!(value_text(&json!(7)), "7");
        assert_eq!(value_f64(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(value_f64(&json!("n/a")), None);
        assert_eq!(value_f64(&Value::Null), None);
    }
}
