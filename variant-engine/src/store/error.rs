//! Persistence errors for the product store and the cost database

use shared::error::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode database: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Database file {path} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Database file {0} could not be repaired")]
    RepairFailed(PathBuf),

    #[error("Database root must be a JSON object")]
    NotAnObject,

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(PathBuf),

    #[error("No valid snapshot in {0}")]
    NoValidSnapshot(PathBuf),

    #[error("Recovery aborted")]
    RecoveryAborted,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product already exists: {0}")]
    ProductExists(String),

    #[error("Product {key} could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::IoError,
            Self::Encode(_) => ErrorCode::StoreWriteFailed,
            Self::Corrupted { .. } | Self::NotAnObject => ErrorCode::StoreCorrupted,
            Self::RepairFailed(_) => ErrorCode::StoreRepairFailed,
            Self::SnapshotNotFound(_) => ErrorCode::SnapshotNotFound,
            Self::NoValidSnapshot(_) => ErrorCode::NoValidSnapshot,
            Self::RecoveryAborted => ErrorCode::RecoveryAborted,
            Self::ProductNotFound(_) => ErrorCode::ProductNotFound,
            Self::ProductExists(_) => ErrorCode::ProductAlreadyExists,
            Self::Decode { .. } => ErrorCode::ProductDecodeFailed,
        }
    }
}

#[derive(Debug, Error)]
pub enum CostDbError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cost database is corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    #[error("Failed to read cost file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cost file is missing the {0:?} column")]
    MissingColumn(&'static str),

    #[error("Part number not found: {0}")]
    PartNotFound(String),

    #[error("Part number already exists: {0}")]
    PartExists(String),

    #[error("Part number is empty")]
    EmptyPartNumber,

    #[error("Price for {0} is empty")]
    EmptyPrice(String),

    #[error("Cost file has no column {column} (row has {width})")]
    ColumnOutOfRange { column: String, width: usize },
}

impl CostDbError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Corrupted(_) => ErrorCode::CostDatabaseCorrupted,
            Self::Csv(_) => ErrorCode::CostImportFailed,
            Self::MissingColumn(_) => ErrorCode::CostImportMissingColumn,
            Self::PartNotFound(_) => ErrorCode::PartNotFound,
            Self::EmptyPrice(_) => ErrorCode::InvalidPrice,
            Self::ColumnOutOfRange { .. } => ErrorCode::CostImportMissingColumn,
            Self::PartExists(_) => ErrorCode::PartAlreadyExists,
            Self::EmptyPartNumber => ErrorCode::RequiredField,
        }
    }
}
