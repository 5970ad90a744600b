//! Establishment Settings Model
//!
//! [`Settings`] is what the store holds, [`SettingsInput`] is what an owner
//! submits (validated before it is ever written), and [`Thresholds`] is the
//! resolved view the status engine reads. The engine never fails on bad
//! settings: anything malformed resolves to the documented defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Default GREEN ceiling: 1 minute
pub const DEFAULT_TIME_GREEN_SECONDS: u32 = 60;
/// Default YELLOW ceiling: 3 minutes
pub const DEFAULT_TIME_YELLOW_SECONDS: u32 = 180;
pub const DEFAULT_QTY_GREEN: u32 = 2;
pub const DEFAULT_QTY_YELLOW: u32 = 4;
pub const DEFAULT_TOTAL_TABLES: u32 = 20;

/// Upper bound for `total_tables` (table numbers are at most 3 characters)
pub const MAX_TOTAL_TABLES: u32 = 999;

/// Per-establishment semaphore configuration (门店设置)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub time_green_seconds: u32,
    pub time_yellow_seconds: u32,
    /// Displayed configuration only; not used for escalation
    pub qty_green: u32,
    /// Displayed configuration only; not used for escalation
    pub qty_yellow: u32,
    pub total_tables: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_green_seconds: DEFAULT_TIME_GREEN_SECONDS,
            time_yellow_seconds: DEFAULT_TIME_YELLOW_SECONDS,
            qty_green: DEFAULT_QTY_GREEN,
            qty_yellow: DEFAULT_QTY_YELLOW,
            total_tables: DEFAULT_TOTAL_TABLES,
        }
    }
}

impl Settings {
    /// Whether the engine can use these values as-is
    pub fn is_well_formed(&self) -> bool {
        self.time_green_seconds < self.time_yellow_seconds
            && (1..=MAX_TOTAL_TABLES).contains(&self.total_tables)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Invalid time thresholds: {0}")]
    TimeThresholds(String),

    #[error("Invalid quantity thresholds: {0}")]
    QuantityThresholds(String),

    #[error("Invalid total tables: {0}")]
    TableCount(i64),
}

/// Settings change submitted by the establishment owner
///
/// Fields are signed so negative input is rejected here instead of failing
/// deserialization somewhere less helpful.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SettingsInput {
    #[validate(range(min = 0))]
    pub time_green_seconds: i64,
    #[validate(range(min = 0))]
    pub time_yellow_seconds: i64,
    #[validate(range(min = 0))]
    pub qty_green: i64,
    #[validate(range(min = 0))]
    pub qty_yellow: i64,
    #[validate(range(min = 1, max = 999))]
    pub total_tables: i64,
}

impl From<Settings> for SettingsInput {
    fn from(s: Settings) -> Self {
        Self {
            time_green_seconds: i64::from(s.time_green_seconds),
            time_yellow_seconds: i64::from(s.time_yellow_seconds),
            qty_green: i64::from(s.qty_green),
            qty_yellow: i64::from(s.qty_yellow),
            total_tables: i64::from(s.total_tables),
        }
    }
}

impl SettingsInput {
    /// Validate at the configuration boundary and produce storable settings.
    ///
    /// Rejects negatives, `green >= yellow` (time and quantity) and table
    /// counts outside `1..=999`. Values are never clamped.
    pub fn into_settings(self) -> Result<Settings, SettingsError> {
        if let Err(errors) = self.validate() {
            let fields = errors.field_errors();
            if fields.contains_key("time_green_seconds") || fields.contains_key("time_yellow_seconds")
            {
                return Err(SettingsError::TimeThresholds(
                    "times must not be negative".to_string(),
                ));
            }
            if fields.contains_key("qty_green") || fields.contains_key("qty_yellow") {
                return Err(SettingsError::QuantityThresholds(
                    "quantities must not be negative".to_string(),
                ));
            }
            return Err(SettingsError::TableCount(self.total_tables));
        }

        if self.time_green_seconds >= self.time_yellow_seconds {
            return Err(SettingsError::TimeThresholds(format!(
                "green ({}s) must be lower than yellow ({}s)",
                self.time_green_seconds, self.time_yellow_seconds
            )));
        }
        if self.qty_green >= self.qty_yellow {
            return Err(SettingsError::QuantityThresholds(format!(
                "green ({}) must be lower than yellow ({})",
                self.qty_green, self.qty_yellow
            )));
        }

        let time = |v: i64| {
            u32::try_from(v)
                .map_err(|_| SettingsError::TimeThresholds(format!("{}s is too large", v)))
        };
        let qty = |v: i64| {
            u32::try_from(v)
                .map_err(|_| SettingsError::QuantityThresholds(format!("{} is too large", v)))
        };
        Ok(Settings {
            time_green_seconds: time(self.time_green_seconds)?,
            time_yellow_seconds: time(self.time_yellow_seconds)?,
            qty_green: qty(self.qty_green)?,
            qty_yellow: qty(self.qty_yellow)?,
            total_tables: u32::try_from(self.total_tables)
                .map_err(|_| SettingsError::TableCount(self.total_tables))?,
        })
    }
}

/// Resolved thresholds read by the status engine on every computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub green_millis: i64,
    pub yellow_millis: i64,
    pub qty_green: u32,
    pub qty_yellow: u32,
    pub total_tables: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Thresholds {
    fn from_settings(s: &Settings) -> Self {
        Self {
            green_millis: i64::from(s.time_green_seconds) * 1000,
            yellow_millis: i64::from(s.time_yellow_seconds) * 1000,
            qty_green: s.qty_green,
            qty_yellow: s.qty_yellow,
            total_tables: s.total_tables,
        }
    }

    /// Resolve possibly missing or malformed settings. Never fails.
    pub fn resolve(settings: Option<&Settings>) -> Self {
        match settings {
            Some(s) if s.is_well_formed() => Self::from_settings(s),
            Some(s) => {
                tracing::debug!(settings = ?s, "Malformed settings, falling back to defaults");
                Self::default()
            }
            None => Self::default(),
        }
    }
}
