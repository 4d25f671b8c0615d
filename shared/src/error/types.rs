//! Coded error as reported to the operator

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::codes::ErrorCode;

/// Error carrying a stable [`ErrorCode`] and the text shown to the operator
///
/// Each component keeps its own error enum; they all flatten into this one
/// when a command finishes, which is where the exit status is decided.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Extra key/value context, e.g. the base SKU or part number involved
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
}

impl AppError {
    /// Error with the code's stock message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Attach one context entry
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn product_not_found(base_sku: &str) -> Self {
        Self::with_message(ErrorCode::ProductNotFound, format!("Base SKU '{base_sku}' not found"))
            .with_context("base_sku", base_sku)
    }

    pub fn part_not_found(part: &str) -> Self {
        Self::with_message(ErrorCode::PartNotFound, format!("Part '{part}' not in cost database"))
            .with_context("part_number", part)
    }

    /// Process exit status: 0 on success, 2 for a cancelled command, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self.code {
            c if c.is_success() => 0,
            ErrorCode::Cancelled => 2,
            _ => 1,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
