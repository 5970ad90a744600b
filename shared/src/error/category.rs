//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 4xxx: Call errors
/// - 6xxx: Settings errors
/// - 7xxx: Table errors
/// - 8xxx: Store errors
/// - anything unassigned: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Call errors (4xxx)
    Call,
    /// Settings errors (6xxx)
    Settings,
    /// Table errors (7xxx)
    Table,
    /// Store errors (8xxx)
    Store,
    /// Codes outside every assigned range
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            4000..5000 => Self::Call,
            6000..7000 => Self::Settings,
            7000..8000 => Self::Table,
            8000..9000 => Self::Store,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Settings => "settings",
            Self::Table => "table",
            Self::Store => "store",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
