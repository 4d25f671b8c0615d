//! Variant Engine - product variation configurator
//!
//! # Overview
//!
//! Imports product variant spreadsheets, keeps per-option add-on costs in
//! step with a cost database of part numbers, and regenerates priced
//! variant tables with new SKU codes.
//!
//! - **Catalog** (`catalog`): associated-SKU codec, option master table,
//!   SKU generator, variant aggregation, spreadsheet import
//! - **Pricing** (`pricing`): option totals and price breakdowns in `Decimal`
//! - **Store** (`store`): product store and cost database on disk, atomic
//!   writes, repair, snapshots
//! - **Reconcile** (`reconcile`): bulk cost propagation, exports,
//!   cross-product reference maintenance
//! - **Services** (`services`): workflows, background jobs, cloud sync
//!
//! # Module layout
//!
//! ```text
//! variant-engine/src/
//! ├── core/          # config, paths, application context
//! ├── catalog/       # product data rules
//! ├── pricing/       # decimal arithmetic
//! ├── store/         # persistence
//! ├── reconcile/     # whole-store operations
//! ├── services/      # workflows
//! └── utils/         # errors, logging, CSV helpers
//! ```

pub mod catalog;
pub mod core;
pub mod pricing;
pub mod reconcile;
pub mod services;
pub mod store;
pub mod utils;

pub use crate::core::{AppContext, Config, DataPaths};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};
