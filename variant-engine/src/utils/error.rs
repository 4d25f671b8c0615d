//! Application error
//!
//! Every layer has its own error enum; this type rolls them up for the
//! workflows and the command-line edge, and maps each onto the shared
//! [`ErrorCode`] taxonomy.
//!
//! | Layer | Enum | Code range |
//! |-------|------|------------|
//! | catalog | [`CatalogError`] | 6xxx |
//! | cost database | [`CostDbError`] | 7xxx |
//! | product store | [`StoreError`] | 8xxx |
//! | reconciliation | [`ReconcileError`] | 8xxx / 9xxx |
//! | cloud helper | [`ClientError`] | 9xxx |

use crate::catalog::CatalogError;
use crate::reconcile::ReconcileError;
use crate::store::{CostDbError, StoreError};
use cloud_client::ClientError;
use shared::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Layer errors ==========
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    CostDb(#[from] CostDbError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Cloud(#[from] ClientError),

    // ========== Caller errors ==========
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cancelled")]
    Cancelled,

    // ========== System errors ==========
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cloud helper service is not configured")]
    CloudUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Catalog(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::CostDb(e) => e.error_code(),
            Self::Reconcile(e) => e.error_code(),
            Self::Cloud(e) => e.error_code(),
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Conflict(_) => ErrorCode::AlreadyExists,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::CloudUnavailable => ErrorCode::CloudServiceUnavailable,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Structured form for reports
    pub fn to_shared(&self) -> shared::AppError {
        match self {
            Self::Store(StoreError::ProductNotFound(sku)) => shared::AppError::product_not_found(sku),
            Self::CostDb(CostDbError::PartNotFound(part)) => shared::AppError::part_not_found(part),
            _ => shared::AppError::with_message(self.error_code(), self.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<AppError> for shared::AppError {
    fn from(err: AppError) -> Self {
        err.to_shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_errors_keep_their_codes() {
        let err: AppError = CatalogError::InvalidBasePrice("abc".into()).into();
        assert_eq!(err.error_code(), ErrorCode::InvalidBasePrice);

        let err: AppError = StoreError::ProductNotFound("X".into()).into();
        assert_eq!(err.error_code(), ErrorCode::ProductNotFound);
        assert_eq!(err.to_string(), "Product not found: X");

        let err: AppError = CostDbError::MissingColumn("Price").into();
        assert_eq!(err.error_code(), ErrorCode::CostImportMissingColumn);
    }

    #[test]
    fn test_to_shared() {
        let shared = AppError::validation("bad price").to_shared();
        assert_eq!(shared.code, ErrorCode::ValidationFailed);
        assert_eq!(shared.message, "Validation error: bad price");
        assert_eq!(shared.code.category(), shared::ErrorCategory::General);

        let shared = AppError::from(StoreError::ProductNotFound("BIKE".into())).to_shared();
        assert_eq!(shared.context["base_sku"], "BIKE");
        assert_eq!(AppError::Cancelled.to_shared().exit_code(), 2);
    }
}
