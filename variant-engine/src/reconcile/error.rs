//! Reconciliation and export errors

use crate::store::{CostDbError, StoreError};
use shared::error::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    CostDb(#[from] CostDbError),

    #[error("Failed to export {base_sku}: {source}")]
    Export {
        base_sku: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to create export directory {path}: {source}")]
    ExportDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Background job failed: {0}")]
    Job(String),
}

impl ReconcileError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Store(e) => e.error_code(),
            Self::CostDb(e) => e.error_code(),
            Self::Export { .. } | Self::ExportDir { .. } => ErrorCode::ExportFailed,
            Self::Job(_) => ErrorCode::InternalError,
        }
    }
}
