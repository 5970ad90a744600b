//! Domain models
//!
//! Every model is plain data with serde derives; behavior that must be
//! identical for all consumers (status transitions, table normalization,
//! settings validation) lives on the model itself.

pub mod call;
pub mod customer;
pub mod establishment;
pub mod settings;
pub mod table;

pub use call::{Call, CallId, CallStatus, CallType};
pub use customer::CustomerProfile;
pub use establishment::EstablishmentSnapshot;
pub use settings::{Settings, SettingsError, SettingsInput, Thresholds};
pub use table::{Table, TableNumber, TableNumberError};
