//! Option master table: per-product (Name, Value) -> cost, weight, parts

use super::amount::Amount;
use super::lenient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One component of an option's associated-SKU field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssociatedSku {
    /// Component SKU
    pub sku: String,
    /// Cost as decimal text; not guaranteed numeric
    pub cost: String,
    /// Cost database key; empty means "look up by `sku`"
    pub part_number: String,
}

impl AssociatedSku {
    pub fn new(sku: impl Into<String>, cost: impl Into<String>, part_number: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            cost: cost.into(),
            part_number: part_number.into(),
        }
    }

    /// Key used against the cost database
    pub fn lookup_key(&self) -> &str {
        if self.part_number.is_empty() {
            &self.sku
        } else {
            &self.part_number
        }
    }
}

/// Option master table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRow {
    #[serde(rename = "Name", default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "Value", default, deserialize_with = "lenient::string")]
    pub value: String,
    #[serde(rename = "Add'l Cost", default = "Amount::zero")]
    pub cost: Amount,
    #[serde(rename = "Add'l Weight", default = "Amount::zero")]
    pub weight: Amount,
    #[serde(rename = "Associated SKUs", default, deserialize_with = "lenient::string")]
    pub associated: String,
    /// Columns this tool does not interpret, preserved on write
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OptionRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            cost: Amount::zero(),
            weight: Amount::zero(),
            associated: String::new(),
            extra: Map::new(),
        }
    }

    pub fn matches(&self, name: &str, value: &str) -> bool {
        self.name == name && self.value == value
    }
}

/// Ordered option rows of one product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionMasterTable(pub Vec<OptionRow>);

impl OptionMasterTable {
    pub fn new(rows: Vec<OptionRow>) -> Self {
        Self(rows)
    }

    pub fn rows(&self) -> &[OptionRow] {
        &self.0
    }

    pub fn rows_mut(&mut self) -> &mut [OptionRow] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find(&self, name: &str, value: &str) -> Option<&OptionRow> {
        self.0.iter().find(|r| r.matches(name, value))
    }

    pub fn find_mut(&mut self, name: &str, value: &str) -> Option<&mut OptionRow> {
        self.0.iter_mut().find(|r| r.matches(name, value))
    }

    /// Append a row unless (Name, Value) is already present
    pub fn push_unique(&mut self, row: OptionRow) -> bool {
        if self.find(&row.name, &row.value).is_some() {
            return false;
        }
        self.0.push(row);
        true
    }

    /// Distinct option names in first-seen order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.0 {
            if !names.contains(&row.name.as_str()) {
                names.push(&row.name);
            }
        }
        names
    }
}
