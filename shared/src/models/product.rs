//! Product record, the value stored per base SKU in the product store

use super::amount::Amount;
use super::input::InputRow;
use super::lenient;
use super::option::OptionMasterTable;
use super::variant::VariantRow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored state of one product
///
/// Every field defaults when absent: a record holding only `last_export` is
/// valid. Keys this type does not know are kept in `extra` and written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub input_df: Vec<InputRow>,
    #[serde(default)]
    pub master_df: OptionMasterTable,
    #[serde(default)]
    pub in_tree_df: Vec<VariantRow>,
    #[serde(default = "Amount::zero")]
    pub base_price: Amount,
    #[serde(default = "Amount::zero")]
    pub base_weight: Amount,
    #[serde(default, deserialize_with = "lenient::string")]
    pub base_sku: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub prefix: String,
    /// `%Y-%m-%d %H:%M:%S` of the last spreadsheet export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_export: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self {
            input_df: Vec::new(),
            master_df: OptionMasterTable::default(),
            in_tree_df: Vec::new(),
            base_price: Amount::zero(),
            base_weight: Amount::zero(),
            base_sku: String::new(),
            prefix: String::new(),
            last_export: None,
            extra: Map::new(),
        }
    }
}

impl ProductRecord {
    /// Base SKU to generate from: the stored one, or the store key when blank
    pub fn effective_base_sku<'a>(&'a self, key: &'a str) -> &'a str {
        let stored = self.base_sku.trim();
        if stored.is_empty() { key } else { stored }
    }

    /// Option column names of the variant table (sorted)
    pub fn option_columns(&self) -> Vec<String> {
        self.in_tree_df
            .first()
            .map(|row| row.options.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }
}
