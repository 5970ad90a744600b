//! Shared types for the service-call engine
//!
//! Domain models (calls, tables, settings, establishments), the semaphore
//! status engine, statistics and the unified error system. Nothing in this
//! crate performs I/O; everything is a pure function of its inputs.

pub mod error;
pub mod models;
pub mod stats;
pub mod status;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    Call, CallId, CallStatus, CallType, CustomerProfile, EstablishmentSnapshot, Settings,
    SettingsInput, Table, TableNumber, Thresholds,
};
pub use status::{EstablishmentBoard, Semaphore, TableView, TypeView};
