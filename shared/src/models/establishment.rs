//! Establishment Snapshot Model

use super::call::Call;
use super::settings::{Settings, Thresholds};
use super::table::{Table, TableNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full establishment state as returned by one store read
///
/// A snapshot is never patched: a sync cycle replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstablishmentSnapshot {
    pub establishment_id: String,
    /// Raw settings as stored; `None` when never configured
    pub settings: Option<Settings>,
    /// Heartbeat flag set by the owner session
    pub is_open: bool,
    /// Last heartbeat write (Unix millis)
    pub heartbeat_at: Option<i64>,
    /// Active calls across all tables, ordered by `created_at` ascending
    pub calls: Vec<Call>,
    /// When this snapshot was read (Unix millis)
    pub fetched_at: i64,
}

impl EstablishmentSnapshot {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::resolve(self.settings.as_ref())
    }

    /// Whether customers should treat the establishment as open.
    ///
    /// The flag alone is not trusted: an owner session that died without
    /// logging out stops refreshing the heartbeat, and after `max_age_millis`
    /// the establishment reads as closed.
    pub fn is_open_at(&self, now: i64, max_age_millis: i64) -> bool {
        match self.heartbeat_at {
            Some(at) if self.is_open => now.saturating_sub(at) <= max_age_millis,
            _ => false,
        }
    }

    /// Rebuild every table slot `1..=total_tables`, including empty ones.
    ///
    /// Calls at tables outside that range (letters, or slots beyond the
    /// configured count) are kept: they are appended after the numbered
    /// slots, in table-number order.
    pub fn tables(&self) -> Vec<Table> {
        let total = self.thresholds().total_tables;
        let mut slots: Vec<Table> = (1..=total)
            .filter_map(|n| TableNumber::slot(n).ok())
            .map(Table::new)
            .collect();
        let mut extra: BTreeMap<TableNumber, Table> = BTreeMap::new();

        for call in &self.calls {
            let slot = call
                .table_number
                .slot_index()
                .filter(|n| (1..=total).contains(n))
                .and_then(|n| slots.get_mut((n - 1) as usize));
            match slot {
                Some(table) => table.calls.push(call.clone()),
                None => extra
                    .entry(call.table_number.clone())
                    .or_insert_with(|| Table::new(call.table_number.clone()))
                    .calls
                    .push(call.clone()),
            }
        }

        slots.extend(extra.into_values());
        slots
    }

    /// One table by number; empty if nobody has called from it
    pub fn table(&self, number: &TableNumber) -> Table {
        Table {
            number: number.clone(),
            calls: self
                .calls
                .iter()
                .filter(|c| &c.table_number == number)
                .cloned()
                .collect(),
        }
    }
}
