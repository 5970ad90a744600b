//! Table Model

use super::call::{Call, CallType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length of a normalized table number
pub const MAX_TABLE_NUMBER_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableNumberError {
    #[error("Table number is empty")]
    Empty,

    #[error("Table number too long: {0} (max 3 characters)")]
    TooLong(String),
}

/// Normalized table number (桌号)
///
/// Uppercase ASCII letters and digits, 1 to 3 characters. Purely numeric
/// numbers carry no leading zeros, so `"07"` and `"7"` address the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableNumber(String);

impl TableNumber {
    pub fn parse(raw: &str) -> Result<Self, TableNumberError> {
        let mut normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.chars().all(|c| c.is_ascii_digit()) {
            let trimmed = normalized.trim_start_matches('0');
            normalized = if trimmed.is_empty() && !normalized.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            };
        }

        if normalized.is_empty() {
            return Err(TableNumberError::Empty);
        }
        if normalized.len() > MAX_TABLE_NUMBER_LEN {
            return Err(TableNumberError::TooLong(normalized));
        }
        Ok(Self(normalized))
    }

    /// Table number for the numbered slot `n` (1-based)
    pub fn slot(n: u32) -> Result<Self, TableNumberError> {
        Self::parse(&n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric slot index, if this table number is purely numeric
    pub fn slot_index(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}

impl fmt::Display for TableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TableNumber {
    type Error = TableNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TableNumber> for String {
    fn from(value: TableNumber) -> Self {
        value.0
    }
}

/// A table slot together with its calls, in store (insertion) order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub number: TableNumber,
    pub calls: Vec<Call>,
}

impl Table {
    pub fn new(number: TableNumber) -> Self {
        Self {
            number,
            calls: Vec::new(),
        }
    }

    /// Calls that are still SENT or VIEWED
    pub fn active_calls(&self) -> impl Iterator<Item = &Call> {
        self.calls.iter().filter(|c| c.is_active())
    }

    /// Active calls of one type, in the order the snapshot listed them
    pub fn active_calls_of(&self, call_type: CallType) -> impl Iterator<Item = &Call> {
        self.active_calls().filter(move |c| c.call_type == call_type)
    }

    pub fn active_count(&self) -> usize {
        self.active_calls().count()
    }

    /// A table with no active calls is idle, but still an addressable slot
    pub fn is_idle(&self) -> bool {
        self.active_calls().next().is_none()
    }
}
