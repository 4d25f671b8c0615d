//! Catalog: per-product data operations
//!
//! - [`associated`] - associated-SKU field codec
//! - [`option_blob`] - `Name=…|Value=…` parsing
//! - [`master`] - option master table build, cost sync, edits
//! - [`sku_code`] - New SKU generation
//! - [`variants`] - variant table aggregation, spot check, breakdown
//! - [`import`] - variant CSV import

pub mod associated;
mod error;
pub mod import;
pub mod master;
pub mod option_blob;
pub mod sku_code;
pub mod variants;

pub use error::CatalogError;
pub use import::{ImportChoice, ImportedProduct, Storefront};
pub use master::{AssignmentReport, OptionEdit};
pub use sku_code::{SkuCodeGenerator, SkuLengthWarning};
pub use variants::BaseValues;
