//! Generated variant row (`in_tree_df`)
//!
//! Column order on disk is `#`, `SKU`, `New SKU`, `Price`, `Weight`, then one
//! column per option name. Option columns are dynamic, so this type carries
//! its own serde impls instead of a derived struct layout.

use super::lenient::{value_f64, value_text};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const COL_INDEX: &str = "#";
const COL_SKU: &str = "SKU";
const COL_NEW_SKU: &str = "New SKU";
const COL_PRICE: &str = "Price";
const COL_WEIGHT: &str = "Weight";

/// One generated variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantRow {
    /// 1-based position in the imported rows
    pub index: usize,
    pub sku: String,
    pub new_sku: String,
    pub price: f64,
    pub weight: f64,
    /// (option name, selected value) in column order; empty when unselected
    pub options: Vec<(String, String)>,
}

impl VariantRow {
    /// Selected value for an option column
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header row for spreadsheet export
    pub fn header(option_names: &[String]) -> Vec<String> {
        let mut cols: Vec<String> = [COL_INDEX, COL_SKU, COL_NEW_SKU, COL_PRICE, COL_WEIGHT]
            .iter()
            .map(|s| s.to_string())
            .collect();
        cols.extend(option_names.iter().cloned());
        cols
    }

    /// Cells in header order
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.index.to_string(),
            self.sku.clone(),
            self.new_sku.clone(),
            format_number(self.price),
            format_number(self.weight),
        ];
        cells.extend(self.options.iter().map(|(_, v)| v.clone()));
        cells
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let index = map
            .remove(COL_INDEX)
            .and_then(|v| value_f64(&v))
            .filter(|f| *f >= 0.0)
            .map(|f| f as usize)
            .unwrap_or_default();
        let sku = map.remove(COL_SKU).map(|v| value_text(&v)).unwrap_or_default();
        let new_sku = map
            .remove(COL_NEW_SKU)
            .map(|v| value_text(&v))
            .unwrap_or_default();
        let price = map
            .remove(COL_PRICE)
            .and_then(|v| value_f64(&v))
            .unwrap_or_default();
        let weight = map
            .remove(COL_WEIGHT)
            .and_then(|v| value_f64(&v))
            .unwrap_or_default();
        let options = map
            .into_iter()
            .map(|(k, v)| (k, value_text(&v)))
            .collect();

        Self {
            index,
            sku,
            new_sku,
            price,
            weight,
            options,
        }
    }
}

fn format_number(v: f64) -> String {
    format!("{:.2}", v)
}

impl Serialize for VariantRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5 + self.options.len()))?;
        map.serialize_entry(COL_INDEX, &self.index)?;
        map.serialize_entry(COL_SKU, &self.sku)?;
        map.serialize_entry(COL_NEW_SKU, &self.new_sku)?;
        map.serialize_entry(COL_PRICE, &self.price)?;
        map.serialize_entry(COL_WEIGHT, &self.weight)?;
        for (name, value) in &self.options {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VariantRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(D::Error::custom(format!(
                "variant row must be an object, got {}",
                other
            ))),
        }
    }
}
