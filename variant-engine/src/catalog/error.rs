//! Catalog errors (product data validation and variant import)

use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Base price is not a number: {0:?}")]
    InvalidBasePrice(String),

    #[error("Base weight is not a number: {0:?}")]
    InvalidBaseWeight(String),

    #[error("Base SKU is empty")]
    EmptyBaseSku,

    #[error("Option {name}={value} not found")]
    OptionNotFound { name: String, value: String },

    #[error("{field} must be a number, got {value:?}")]
    InvalidOptionValue { field: &'static str, value: String },

    #[error("Every option needs a value; missing: {0}")]
    IncompleteSelection(String),

    #[error("No variant matches the selection")]
    VariantNotFound,

    #[error("Variant file is missing the {0:?} column")]
    MissingColumn(&'static str),

    #[error("Variant file has no rows")]
    EmptyImport,

    #[error("Failed to read variant file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read variant file: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidBasePrice(_) => ErrorCode::InvalidBasePrice,
            Self::InvalidBaseWeight(_) => ErrorCode::InvalidBaseWeight,
            Self::EmptyBaseSku => ErrorCode::EmptyBaseSku,
            Self::OptionNotFound { .. } => ErrorCode::OptionNotFound,
            Self::InvalidOptionValue { .. } => ErrorCode::InvalidOptionValue,
            Self::IncompleteSelection(_) => ErrorCode::RequiredField,
            Self::VariantNotFound => ErrorCode::VariantNotFound,
            Self::MissingColumn(_) => ErrorCode::VariantImportMissingColumn,
            Self::EmptyImport => ErrorCode::VariantImportEmpty,
            Self::Csv(_) | Self::Io(_) => ErrorCode::VariantImportFailed,
        }
    }
}
