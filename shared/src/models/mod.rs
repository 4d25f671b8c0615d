//! Data models
//!
//! Persisted shapes of the product store and cost database. Every field of a
//! stored record is optional on read with a declared default, and values
//! that older files wrote as numbers or nulls are read back as text.

pub mod amount;
pub mod cost;
pub mod input;
pub mod lenient;
pub mod option;
pub mod product;
pub mod variant;

// Re-exports
pub use amount::Amount;
pub use cost::{CostDatabase, PriceValue};
pub use input::InputRow;
pub use option::{AssociatedSku, OptionMasterTable, OptionRow};
pub use product::ProductRecord;
pub use variant::VariantRow;
