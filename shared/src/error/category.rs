//! Which part of the system an error code belongs to

use std::fmt;

use serde::{Deserialize, Serialize};

use super::codes::ErrorCode;

/// Coarse grouping of [`ErrorCode`]s, taken from the thousands digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx
    General,
    /// 6xxx: option tables, variants, SKU generation
    Product,
    /// 7xxx: parts and prices
    CostDatabase,
    /// 8xxx: database files, snapshots, backups
    Storage,
    /// 9xxx and any unassigned range
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            6 => Self::Product,
            7 => Self::CostDatabase,
            8 => Self::Storage,
            _ => Self::System,
        }
    }

    /// Whether the operator can usually fix this by correcting input files
    pub fn is_data_problem(self) -> bool {
        matches!(self, Self::Product | Self::CostDatabase | Self::Storage)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::General => "general",
            Self::Product => "product",
            Self::CostDatabase => "cost_database",
            Self::Storage => "storage",
            Self::System => "system",
        })
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        let cases = [
            (0, ErrorCategory::General),
            (6001, ErrorCategory::Product),
            (7102, ErrorCategory::CostDatabase),
            (8999, ErrorCategory::Storage),
            (9001, ErrorCategory::System),
            (3001, ErrorCategory::System),
        ];
        for (code, category) in cases {
            assert_eq!(ErrorCategory::from_code(code), category, "code {code}");
        }
    }

    #[test]
    fn test_codes_land_in_their_category() {
        assert_eq!(ErrorCode::OptionNotFound.category(), ErrorCategory::Product);
        assert_eq!(ErrorCode::PartNotFound.category(), ErrorCategory::CostDatabase);
        assert_eq!(ErrorCode::NoValidSnapshot.category(), ErrorCategory::Storage);
        assert!(ErrorCode::NoValidSnapshot.category().is_data_problem());
        assert!(!ErrorCode::NetworkError.category().is_data_problem());
    }

    #[test]
    fn test_display_matches_serde() {
        let json = serde_json::to_string(&ErrorCategory::CostDatabase).unwrap();
        assert_eq!(json, format!("\"{}\"", ErrorCategory::CostDatabase));
    }
}
