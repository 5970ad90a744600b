use super::super::store::StoreError;
use shared::error::{AppError, ErrorCode};
use shared::models::{SettingsError, TableNumberError};
use thiserror::Error;

/// Manager errors
///
/// "Nothing to do" is never an error here: attending a call that is already
/// resolved returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid table number: {0}")]
    InvalidTable(#[from] TableNumberError),

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}

impl ManagerError {
    /// Transient failures are retried by the next sync cycle
    pub fn is_transient(&self) -> bool {
        matches!(self, ManagerError::Store(e) if e.is_transient())
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Store(e) => {
                if !e.is_transient() {
                    tracing::error!(error = %e, "Store error occurred");
                }
                e.into()
            }
            ManagerError::InvalidTable(e) => {
                AppError::with_message(ErrorCode::InvalidTableNumber, e.to_string())
            }
            ManagerError::InvalidSettings(e) => {
                let code = match &e {
                    SettingsError::TimeThresholds(_) => ErrorCode::InvalidTimeThresholds,
                    SettingsError::QuantityThresholds(_) => ErrorCode::InvalidQuantityThresholds,
                    SettingsError::TableCount(_) => ErrorCode::InvalidTableCount,
                };
                AppError::with_message(code, e.to_string())
            }
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
