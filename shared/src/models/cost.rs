//! Cost database model (part number -> price)

use super::amount::parse_decimal;
use super::lenient::float_text;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stored price: a JSON number, or text kept verbatim when it did not parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(serde_json::Number),
    Text(String),
}

impl PriceValue {
    /// Price from user input: numeric text becomes a number, anything else
    /// is kept as text
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<f64>() {
            Ok(f) => serde_json::Number::from_f64(f)
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(input.to_string())),
            Err(_) => Self::Text(input.to_string()),
        }
    }

    /// Like [`parse`](Self::parse), with numbers rounded to `dp` places and
    /// text trimmed
    pub fn parse_rounded(input: &str, dp: u32) -> Self {
        parse_decimal(input)
            .and_then(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero).to_f64())
            .and_then(serde_json::Number::from_f64)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Text(input.trim().to_string()))
    }

    /// Text written into an associated-SKU cost field
    pub fn cost_text(&self) -> String {
        match self {
            Self::Number(n) if n.is_f64() => n.as_f64().map(float_text).unwrap_or_else(|| n.to_string()),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        parse_decimal(&self.cost_text())
    }

    pub fn is_numeric(&self) -> bool {
        self.to_decimal().is_some()
    }
}

impl fmt::Display for PriceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cost_text())
    }
}

/// Part number -> price, persisted as `cost_db.json`
///
/// Keys iterate in part-number order so the file diffs cleanly between
/// snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostDatabase {
    entries: BTreeMap<String, PriceValue>,
}

impl CostDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, part_number: &str) -> bool {
        self.entries.contains_key(part_number)
    }

    pub fn get(&self, part_number: &str) -> Option<&PriceValue> {
        self.entries.get(part_number)
    }

    /// Cost text for a part, as written into associated-SKU fields
    pub fn cost_text(&self, part_number: &str) -> Option<String> {
        self.entries.get(part_number).map(PriceValue::cost_text)
    }

    /// Insert or replace; returns the previous price
    pub fn insert(&mut self, part_number: impl Into<String>, price: PriceValue) -> Option<PriceValue> {
        self.entries.insert(part_number.into(), price)
    }

    pub fn remove(&mut self, part_number: &str) -> Option<PriceValue> {
        self.entries.remove(part_number)
    }

    /// Move a price to a new key. Returns false when `old` is absent.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        match self.entries.remove(old) {
            Some(price) => {
                self.entries.insert(new.to_string(), price);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PriceValue)> {
        self.entries.iter()
    }

    pub fn part_numbers(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Case-insensitive substring search over part numbers
    pub fn search<'a>(&'a self, needle: &str) -> Vec<(&'a String, &'a PriceValue)> {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .filter(|(part, _)| part.to_lowercase().contains(&needle))
            .collect()
    }
}

impl FromIterator<(String, PriceValue)> for CostDatabase {
    fn from_iter<I: IntoIterator<Item = (String, PriceValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_value_reads_number_or_text() {
        let db: CostDatabase =
            serde_json::from_str(r#"{"A-1": 12.5, "B-2": 3, "C-3": "call"}"#).unwrap();
        assert_eq!(db.cost_text("A-1").as_deref(), Some("12.5"));
        assert_eq!(db.cost_text("B-2").as_deref(), Some("3"));
        assert_eq!(db.cost_text("C-3").as_deref(), Some("call"));
        assert!(!db.get("C-3").unwrap().is_numeric());
    }

    #[test]
    fn test_parse_user_input() {
        assert_eq!(PriceValue::parse("4").cost_text(), "4.0");
        assert_eq!(PriceValue::parse(" 4.75 ").cost_text(), "4.75");
        assert_eq!(PriceValue::parse("TBD"), PriceValue::Text("TBD".to_string()));
    }

    #[test]
    fn test_parse_rounded() {
        assert_eq!(PriceValue::parse_rounded("12.3456", 2).cost_text(), "12.35");
        assert_eq!(PriceValue::parse_rounded("0.125", 2).cost_text(), "0.13");
        assert_eq!(PriceValue::parse_rounded("7", 2).cost_text(), "7.0");
        assert_eq!(PriceValue::parse_rounded(" quote ", 2), PriceValue::Text("quote".to_string()));
    }

    #[test]
    fn test_rename_and_search() {
        let mut db = CostDatabase::new();
        db.insert("SHOCK-100", PriceValue::parse("10"));
        db.insert("spring-200", PriceValue::parse("5"));
        assert!(db.rename("SHOCK-100", "SHOCK-101"));
        assert!(!db.rename("missing", "x"));
        assert!(db.contains("SHOCK-101"));
        assert!(!db.contains("SHOCK-100"));

        let hits = db.search("SPRING");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "spring-200");
    }

    #[test]
    fn test_serializes_sorted() {
        let mut db = CostDatabase::new();
        db.insert("b", PriceValue::parse("2"));
        db.insert("a", PriceValue::parse("1.5"));
        assert_eq!(serde_json::to_string(&db).unwrap(), r#"{"a":1.5,"b":2.0}"#);
    }
}
