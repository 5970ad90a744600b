//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 4xxx: Call errors
//! - 6xxx: Settings errors
//! - 7xxx: Table errors
//! - 8xxx: Store errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::InvalidTableNumber);
//! assert_eq!(err.code.code(), 7001);
//!
//! let err = AppError::with_message(ErrorCode::InvalidTableCount, "Too many tables")
//!     .with_detail("total_tables", 1500);
//! assert!(err.details.is_some());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
