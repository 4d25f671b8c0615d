//! Shared types for the variant configurator
//!
//! Common types used across the workspace crates: the persisted product
//! model (option master table, variant rows, imported rows, cost database)
//! and the unified error-code taxonomy.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    Amount, AssociatedSku, CostDatabase, InputRow, OptionMasterTable, OptionRow, PriceValue,
    ProductRecord, VariantRow,
};
