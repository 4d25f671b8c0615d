//! Utilities: application error, result alias, logging, CSV helpers
//!
//! - [`AppError`] - application error enum, one variant per layer
//! - [`AppResult`] - result alias
//! - [`logger`] - tracing subscriber setup
//! - [`csv`] - BOM stripping and header lookup

pub mod csv;
pub mod error;
pub mod logger;

pub use error::{AppError, AppResult};
pub use shared::error::{ErrorCategory, ErrorCode};
