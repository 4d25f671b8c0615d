//! Error codes shared by the engine and the cloud client
//!
//! Codes are grouped by thousands: 0xxx general, 6xxx product, 7xxx cost
//! database, 8xxx storage, 9xxx system. Component error enums map onto an
//! [`ErrorCode`]; [`AppError`] is what reaches the operator.
//!
//! ```
//! use shared::error::{AppError, ErrorCategory, ErrorCode};
//!
//! let err = AppError::part_not_found("BRK-10");
//! assert_eq!(err.code, ErrorCode::PartNotFound);
//! assert_eq!(err.code.category(), ErrorCategory::CostDatabase);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
