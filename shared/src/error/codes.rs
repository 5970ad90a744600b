//! Unified error codes for the service-call engine
//!
//! Error codes are organized by category:
//! - 4xxx: Call errors
//! - 6xxx: Settings errors
//! - 7xxx: Table errors
//! - 8xxx: Store / sync errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 4xxx: Call ====================
    /// Call does not exist
    CallNotFound = 4001,

    // ==================== 6xxx: Settings ====================
    /// Time thresholds are negative or not strictly increasing
    InvalidTimeThresholds = 6001,
    /// Quantity thresholds are negative or not strictly increasing
    InvalidQuantityThresholds = 6002,
    /// Total table count out of range
    InvalidTableCount = 6003,

    // ==================== 7xxx: Table ====================
    /// Table number is empty or malformed
    InvalidTableNumber = 7001,

    // ==================== 8xxx: Store ====================
    /// Call store temporarily unavailable (retry on next cycle)
    StoreUnavailable = 8001,
    /// Establishment unknown to the store
    EstablishmentNotFound = 8002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether the failure is transient and should simply be retried later
    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(self, ErrorCode::StoreUnavailable)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // Call
            ErrorCode::CallNotFound => "Call not found",

            // Settings
            ErrorCode::InvalidTimeThresholds => {
                "Green time must be lower than yellow time and neither may be negative"
            }
            ErrorCode::InvalidQuantityThresholds => {
                "Green quantity must be lower than yellow quantity and neither may be negative"
            }
            ErrorCode::InvalidTableCount => "Total tables must be between 1 and 999",

            // Table
            ErrorCode::InvalidTableNumber => "Table number must be 1 to 3 letters or digits",

            // Store
            ErrorCode::StoreUnavailable => "Call store is temporarily unavailable",
            ErrorCode::EstablishmentNotFound => "Establishment not found",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // Call
            4001 => Ok(ErrorCode::CallNotFound),

            // Settings
            6001 => Ok(ErrorCode::InvalidTimeThresholds),
            6002 => Ok(ErrorCode::InvalidQuantityThresholds),
            6003 => Ok(ErrorCode::InvalidTableCount),

            // Table
            7001 => Ok(ErrorCode::InvalidTableNumber),

            // Store
            8001 => Ok(ErrorCode::StoreUnavailable),
            8002 => Ok(ErrorCode::EstablishmentNotFound),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
