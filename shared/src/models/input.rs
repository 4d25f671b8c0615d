//! Imported variant row (`input_df`)

use super::lenient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the imported variant CSV, as stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRow {
    /// Original storefront SKU
    #[serde(rename = "SKU", default, deserialize_with = "lenient::string")]
    pub sku: String,
    /// Raw `Name=..|Value=..` option blob
    #[serde(rename = "Options", default, deserialize_with = "lenient::string")]
    pub options: String,
    /// Every other imported column, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputRow {
    pub fn new(sku: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            options: options.into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_row_keeps_extra_columns() {
        let row: InputRow = serde_json::from_str(
            r#"{"SKU": 1001, "Options": "Name=Color|Value=Red", "Price": "19.99"}"#,
        )
        .unwrap();
        assert_eq!(row.sku, "1001");
        assert_eq!(row.options, "Name=Color|Value=Red");
        assert_eq!(row.extra.get("Price"), Some(&Value::from("19.99")));
    }

    #[test]
    fn test_missing_options_defaults_empty() {
        let row: InputRow = serde_json::from_str(r#"{"SKU": "A"}"#).unwrap();
        assert!(row.options.is_empty());
    }
}
