//! Numeric error codes
//!
//! Numbers are stable once assigned; reports and logs carry the number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Serialized as its bare number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Operation cancelled by the caller
    Cancelled = 8,

    // ==================== 6xxx: Product ====================
    /// Product not found in the store
    ProductNotFound = 6001,
    /// Product with this base SKU already exists
    ProductAlreadyExists = 6002,
    /// Base price is not a number
    InvalidBasePrice = 6003,
    /// Base weight is not a number
    InvalidBaseWeight = 6004,
    /// Base SKU is empty after cleaning
    EmptyBaseSku = 6005,
    /// Product record could not be decoded
    ProductDecodeFailed = 6006,
    /// (Name, Value) pair not in the option table
    OptionNotFound = 6101,
    /// Option cost or weight is not a number
    InvalidOptionValue = 6102,
    /// No variant matches the option selection
    VariantNotFound = 6201,
    /// Variant CSV could not be read
    VariantImportFailed = 6301,
    /// Variant CSV is missing a required column
    VariantImportMissingColumn = 6302,
    /// Variant CSV has no rows
    VariantImportEmpty = 6303,

    // ==================== 7xxx: Cost Database ====================
    /// Part number not found
    PartNotFound = 7001,
    /// Part number already exists
    PartAlreadyExists = 7002,
    /// Price is not valid
    InvalidPrice = 7003,
    /// Cost CSV could not be read
    CostImportFailed = 7101,
    /// Cost CSV is missing a required column
    CostImportMissingColumn = 7102,
    /// Cost database file is not valid JSON
    CostDatabaseCorrupted = 7201,

    // ==================== 8xxx: Storage ====================
    /// Store file is corrupted
    StoreCorrupted = 8001,
    /// Store file could not be repaired
    StoreRepairFailed = 8002,
    /// Store write failed
    StoreWriteFailed = 8003,
    /// Snapshot not found
    SnapshotNotFound = 8101,
    /// No valid snapshot available
    NoValidSnapshot = 8102,
    /// Recovery aborted by the caller
    RecoveryAborted = 8103,
    /// Spreadsheet export failed
    ExportFailed = 8201,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Filesystem error
    IoError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Timeout error
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Cloud helper service reported an error
    CloudServiceError = 9101,
    /// Cloud helper service unreachable
    CloudServiceUnavailable = 9102,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::Cancelled => "Operation cancelled",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductAlreadyExists => "Product already exists",
            ErrorCode::InvalidBasePrice => "Base price must be a number",
            ErrorCode::InvalidBaseWeight => "Base weight must be a number",
            ErrorCode::EmptyBaseSku => "Base SKU is empty",
            ErrorCode::ProductDecodeFailed => "Product record could not be decoded",
            ErrorCode::OptionNotFound => "Option not found",
            ErrorCode::InvalidOptionValue => "Option cost and weight must be numbers",
            ErrorCode::VariantNotFound => "No variant matches the selection",
            ErrorCode::VariantImportFailed => "Variant import failed",
            ErrorCode::VariantImportMissingColumn => "Variant file is missing a required column",
            ErrorCode::VariantImportEmpty => "Variant file has no rows",

            // Cost database
            ErrorCode::PartNotFound => "Part number not found",
            ErrorCode::PartAlreadyExists => "Part number already exists",
            ErrorCode::InvalidPrice => "Price is empty",
            ErrorCode::CostImportFailed => "Cost import failed",
            ErrorCode::CostImportMissingColumn => "Cost file is missing a required column",
            ErrorCode::CostDatabaseCorrupted => "Cost database is corrupted",

            // Storage
            ErrorCode::StoreCorrupted => "Database file is corrupted",
            ErrorCode::StoreRepairFailed => "Database file could not be repaired",
            ErrorCode::StoreWriteFailed => "Database write failed",
            ErrorCode::SnapshotNotFound => "Snapshot not found",
            ErrorCode::NoValidSnapshot => "No valid snapshot available",
            ErrorCode::RecoveryAborted => "Recovery aborted",
            ErrorCode::ExportFailed => "Spreadsheet export failed",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::IoError => "Filesystem error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::CloudServiceError => "Cloud service reported an error",
            ErrorCode::CloudServiceUnavailable => "Cloud service is unavailable",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not an assigned [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl ErrorCode {
    /// Every assigned code, in ascending order
    pub const ALL: [ErrorCode; 39] = [
        Self::Success,
        Self::ValidationFailed,
        Self::NotFound,
        Self::AlreadyExists,
        Self::InvalidFormat,
        Self::RequiredField,
        Self::Cancelled,
        Self::ProductNotFound,
        Self::ProductAlreadyExists,
        Self::InvalidBasePrice,
        Self::InvalidBaseWeight,
        Self::EmptyBaseSku,
        Self::ProductDecodeFailed,
        Self::OptionNotFound,
        Self::InvalidOptionValue,
        Self::VariantNotFound,
        Self::VariantImportFailed,
        Self::VariantImportMissingColumn,
        Self::VariantImportEmpty,
        Self::PartNotFound,
        Self::PartAlreadyExists,
        Self::InvalidPrice,
        Self::CostImportFailed,
        Self::CostImportMissingColumn,
        Self::CostDatabaseCorrupted,
        Self::StoreCorrupted,
        Self::StoreRepairFailed,
        Self::StoreWriteFailed,
        Self::SnapshotNotFound,
        Self::NoValidSnapshot,
        Self::RecoveryAborted,
        Self::ExportFailed,
        Self::InternalError,
        Self::IoError,
        Self::NetworkError,
        Self::TimeoutError,
        Self::ConfigError,
        Self::CloudServiceError,
        Self::CloudServiceUnavailable,
    ];
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
