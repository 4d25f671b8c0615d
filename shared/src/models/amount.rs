//! Free-text money / weight amount
//!
//! Amounts are entered by hand and stored as text. Arithmetic happens in
//! `Decimal`; the raw text is kept so an unparsable entry survives a round
//! trip and can be reported instead of silently rewritten.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Raw amount text as typed or imported (`"12.50"`, `"0"`, `""`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// `"0"`, the declared default for costs and weights
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Amount from a computed value, trailing zeros removed
    pub fn from_decimal(value: Decimal) -> Self {
        Self(value.normalize().to_string())
    }

    pub fn from_f64(value: f64) -> Self {
        Decimal::from_f64(value)
            .map(Self::from_decimal)
            .unwrap_or_else(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parsed value; `None` when blank or not a number
    pub fn to_decimal(&self) -> Option<Decimal> {
        parse_decimal(&self.0)
    }

    /// Parsed value, non-numeric text counted as zero
    pub fn decimal_or_zero(&self) -> Decimal {
        self.to_decimal().unwrap_or(Decimal::ZERO)
    }
}

/// Parse decimal text the way a spreadsheet user types it (`12`, `12.5`,
/// ` 3 `, `1e2`)
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    Decimal::from_str(t)
        .or_else(|_| Decimal::from_scientific(t))
        .ok()
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Amount {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        super::lenient::string(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Amount::from("12.50").to_decimal(), Some(Decimal::new(1250, 2)));
        assert_eq!(Amount::from(" 3 ").to_decimal(), Some(Decimal::from(3)));
        assert_eq!(Amount::from("1e2").to_decimal(), Some(Decimal::from(100)));
        assert_eq!(Amount::from("").to_decimal(), None);
        assert_eq!(Amount::from("abc").to_decimal(), None);
        assert_eq!(Amount::from("abc").decimal_or_zero(), Decimal::ZERO);
    }

    #[test]
    fn test_from_decimal_normalizes() {
        assert_eq!(Amount::from_decimal(Decimal::new(1200, 2)).as_str(), "12");
        assert_eq!(Amount::from_decimal(Decimal::new(1250, 2)).as_str(), "12.5");
        assert_eq!(Amount::from_f64(0.1 + 0.2).to_decimal().map(|d| d.round_dp(2)), Some(Decimal::new(30, 2)));
    }

    #[test]
    fn test_json_reads_numbers_and_null() {
        let a: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(a.as_str(), "12.5");
        let a: Amount = serde_json::from_str("7").unwrap();
        assert_eq!(a.as_str(), "7");
        let a: Amount = serde_json::from_str("null").unwrap();
        assert!(a.is_blank());
        assert_eq!(serde_json::to_string(&Amount::from("4.25")).unwrap(), "\"4.25\"");
    }
}
