//! Call store collaborator
//!
//! The engine does not own persistence. Whatever holds the call table
//! (a remote database, an HTTP backend, [`MemoryCallStore`] in tests)
//! implements [`CallStore`].
//!
//! # Contract
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | `insert_call` | append a call, return its id |
//! | `list_active_calls` | SENT/VIEWED calls, `created_at` ascending, ties in insertion order |
//! | `update_call_status` | conditional update: only calls for which [`CallStatus::transition`] allows the move change |
//! | `get_establishment_snapshot` | settings, heartbeat and all active calls in one read |
//! | `set_heartbeat` | set or clear the open flag with its timestamp |
//!
//! [`MemoryCallStore`]: super::memory::MemoryCallStore

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::{Call, CallId, CallStatus, CallType, EstablishmentSnapshot, Settings, TableNumber};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Transient I/O failure; the next cycle retries
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Establishment not found: {0}")]
    EstablishmentNotFound(String),

    #[error("Call not found: {0}")]
    CallNotFound(CallId),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::store_unavailable(msg),
            StoreError::EstablishmentNotFound(id) => {
                AppError::new(ErrorCode::EstablishmentNotFound).with_detail("establishment_id", id)
            }
            StoreError::CallNotFound(id) => {
                AppError::new(ErrorCode::CallNotFound).with_detail("call_id", id.0)
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which calls a status update targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSelector {
    /// One call
    Id(CallId),
    /// Every call at one table
    Table(TableNumber),
    /// Every call of the establishment
    Establishment,
}

#[async_trait]
pub trait CallStore: Send + Sync {
    async fn insert_call(
        &self,
        establishment_id: &str,
        table: &TableNumber,
        call_type: CallType,
        status: CallStatus,
        created_at: i64,
    ) -> StoreResult<CallId>;

    async fn list_active_calls(
        &self,
        establishment_id: &str,
        table: Option<&TableNumber>,
        call_type: Option<CallType>,
    ) -> StoreResult<Vec<Call>>;

    /// Move the selected calls to `new_status` where legal.
    ///
    /// Returns the ids that actually changed; calls already in a terminal
    /// state (or already at the target) are skipped silently.
    async fn update_call_status(
        &self,
        establishment_id: &str,
        selector: CallSelector,
        new_status: CallStatus,
    ) -> StoreResult<Vec<CallId>>;

    async fn get_establishment_snapshot(
        &self,
        establishment_id: &str,
    ) -> StoreResult<EstablishmentSnapshot>;

    async fn set_heartbeat(&self, establishment_id: &str, is_open: bool, at: i64) -> StoreResult<()>;

    async fn save_settings(&self, establishment_id: &str, settings: Settings) -> StoreResult<()>;

    /// Full history (all statuses) created at or after `since`
    async fn list_calls_since(&self, establishment_id: &str, since: i64) -> StoreResult<Vec<Call>>;
}
