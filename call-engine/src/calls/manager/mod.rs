//! CallsManager - call lifecycle controller
//!
//! Validates input at the boundary, applies the selection policy ("oldest
//! active call of a type") and issues exactly one store write per
//! operation. Every legal-transition decision goes through
//! [`CallStatus::transition`], which the store applies per call, so a
//! repeated or stale request is a silent no-op rather than an error.
//!
//! # Operation Flow
//!
//! ```text
//! attend_oldest_call_by_type(est, table, type)
//!     ├─ 1. Normalize table number
//!     ├─ 2. list_active_calls(est, table, type)   (created_at ascending)
//!     ├─ 3. Pick the first (oldest, insertion order on ties)
//!     ├─ 4. update_call_status(Id, ATTENDED)       (conditional)
//!     ├─ 5. Lost the race? → Ok(None)
//!     └─ 6. Broadcast CallEvent
//! ```
//!
//! No lock is held between the read in step 2 and the write in step 4;
//! concurrent actors are resolved by the store.

mod error;
pub use error::*;

use super::events::{CallEvent, CallEventKind};
use super::store::{CallSelector, CallStore};
use crate::utils::Clock;
use shared::models::{CallId, CallStatus, CallType, Settings, SettingsInput, TableNumber};
use shared::stats::CallStats;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

pub struct CallsManager {
    store: Arc<dyn CallStore>,
    clock: Arc<dyn Clock>,
    event_tx: broadcast::Sender<CallEvent>,
}

impl std::fmt::Debug for CallsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallsManager")
            .field("store", &"<dyn CallStore>")
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl CallsManager {
    pub fn new(store: Arc<dyn CallStore>, clock: Arc<dyn Clock>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            clock,
            event_tx,
        }
    }

    pub fn store(&self) -> &Arc<dyn CallStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Subscribe to lifecycle events produced by this manager
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: CallEvent) {
        // 无订阅者时发送失败是正常情况
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }

    // ========== Customer / staff operations ==========

    /// Raise a new call (status SENT, created now).
    ///
    /// Calls of the same type queue up; there is no per-table limit.
    pub async fn add_call(
        &self,
        establishment_id: &str,
        table: &str,
        call_type: CallType,
    ) -> ManagerResult<CallId> {
        let table = TableNumber::parse(table)?;
        let now = self.clock.now_millis();
        let id = self
            .store
            .insert_call(establishment_id, &table, call_type, CallStatus::Sent, now)
            .await?;

        tracing::debug!(
            establishment_id = %establishment_id,
            table = %table,
            call_type = %call_type,
            call_id = %id,
            "Call added"
        );
        self.broadcast(
            CallEvent::new(establishment_id, CallEventKind::CallAdded, now)
                .with_table(&table)
                .with_call_type(call_type)
                .with_calls(vec![id]),
        );
        Ok(id)
    }

    /// Resolve the oldest active call of `call_type` at the table.
    ///
    /// Returns the attended call, or `None` when nothing was pending.
    pub async fn attend_oldest_call_by_type(
        &self,
        establishment_id: &str,
        table: &str,
        call_type: CallType,
    ) -> ManagerResult<Option<CallId>> {
        self.resolve_oldest(establishment_id, table, call_type, CallStatus::Attended)
            .await
    }

    /// Withdraw (customer) or reject (staff) the oldest active call of
    /// `call_type` at the table.
    pub async fn cancel_oldest_call_by_type(
        &self,
        establishment_id: &str,
        table: &str,
        call_type: CallType,
    ) -> ManagerResult<Option<CallId>> {
        self.resolve_oldest(establishment_id, table, call_type, CallStatus::Canceled)
            .await
    }

    async fn resolve_oldest(
        &self,
        establishment_id: &str,
        table: &str,
        call_type: CallType,
        target: CallStatus,
    ) -> ManagerResult<Option<CallId>> {
        let table = TableNumber::parse(table)?;
        let active = self
            .store
            .list_active_calls(establishment_id, Some(&table), Some(call_type))
            .await?;

        let Some(oldest) = active.first() else {
            tracing::debug!(
                establishment_id = %establishment_id,
                table = %table,
                call_type = %call_type,
                "No active call to resolve"
            );
            return Ok(None);
        };

        let changed = self
            .store
            .update_call_status(establishment_id, CallSelector::Id(oldest.id), target)
            .await?;
        if changed.is_empty() {
            // 另一端已先行处理
            tracing::debug!(
                establishment_id = %establishment_id,
                call_id = %oldest.id,
                "Call already resolved concurrently"
            );
            return Ok(None);
        }

        let kind = match target {
            CallStatus::Canceled => CallEventKind::CallCanceled,
            _ => CallEventKind::CallAttended,
        };
        tracing::debug!(
            establishment_id = %establishment_id,
            table = %table,
            call_type = %call_type,
            call_id = %oldest.id,
            status = %target,
            "Call resolved"
        );
        self.broadcast(
            CallEvent::new(establishment_id, kind, self.clock.now_millis())
                .with_table(&table)
                .with_call_type(call_type)
                .with_calls(changed),
        );
        Ok(Some(oldest.id))
    }

    /// Acknowledge every SENT call at the table. VIEWED calls are untouched.
    ///
    /// Returns the number of calls that changed.
    pub async fn view_all_calls_for_table(
        &self,
        establishment_id: &str,
        table: &str,
    ) -> ManagerResult<usize> {
        let table = TableNumber::parse(table)?;
        let changed = self
            .store
            .update_call_status(
                establishment_id,
                CallSelector::Table(table.clone()),
                CallStatus::Viewed,
            )
            .await?;
        Ok(self.report_bulk(establishment_id, Some(&table), CallEventKind::TableViewed, changed))
    }

    /// Mark every active call at the table ATTENDED
    pub async fn close_table(&self, establishment_id: &str, table: &str) -> ManagerResult<usize> {
        let table = TableNumber::parse(table)?;
        let changed = self
            .store
            .update_call_status(
                establishment_id,
                CallSelector::Table(table.clone()),
                CallStatus::Attended,
            )
            .await?;
        let count =
            self.report_bulk(establishment_id, Some(&table), CallEventKind::TableClosed, changed);
        tracing::info!(
            establishment_id = %establishment_id,
            table = %table,
            attended = count,
            "Table closed"
        );
        Ok(count)
    }

    /// End the shift: cancel every active call and clear the open flag.
    ///
    /// Returns the number of calls canceled.
    pub async fn close_establishment_workday(&self, establishment_id: &str) -> ManagerResult<usize> {
        let changed = self
            .store
            .update_call_status(establishment_id, CallSelector::Establishment, CallStatus::Canceled)
            .await?;
        // the cancellations are final even if the open flag fails to clear
        let count = self.report_bulk(establishment_id, None, CallEventKind::WorkdayClosed, changed);
        self.store
            .set_heartbeat(establishment_id, false, self.clock.now_millis())
            .await?;

        tracing::info!(
            establishment_id = %establishment_id,
            canceled = count,
            "Workday closed"
        );
        Ok(count)
    }

    fn report_bulk(
        &self,
        establishment_id: &str,
        table: Option<&TableNumber>,
        kind: CallEventKind,
        changed: Vec<CallId>,
    ) -> usize {
        let count = changed.len();
        if count == 0 {
            return 0;
        }
        let mut event =
            CallEvent::new(establishment_id, kind, self.clock.now_millis()).with_calls(changed);
        if let Some(table) = table {
            event = event.with_table(table);
        }
        self.broadcast(event);
        count
    }

    // ========== Owner operations ==========

    /// Validate and persist new settings; invalid input never reaches the store
    pub async fn update_settings(
        &self,
        establishment_id: &str,
        input: SettingsInput,
    ) -> ManagerResult<Settings> {
        let settings = input.into_settings()?;
        self.store.save_settings(establishment_id, settings).await?;

        tracing::info!(
            establishment_id = %establishment_id,
            time_green_seconds = settings.time_green_seconds,
            time_yellow_seconds = settings.time_yellow_seconds,
            total_tables = settings.total_tables,
            "Settings updated"
        );
        self.broadcast(CallEvent::new(
            establishment_id,
            CallEventKind::SettingsUpdated,
            self.clock.now_millis(),
        ));
        Ok(settings)
    }

    /// Set or clear the open flag
    pub async fn heartbeat(&self, establishment_id: &str, is_open: bool) -> ManagerResult<()> {
        self.store
            .set_heartbeat(establishment_id, is_open, self.clock.now_millis())
            .await?;
        Ok(())
    }

    /// Aggregate every call created at or after `since` (all statuses)
    pub async fn stats(&self, establishment_id: &str, since: i64) -> ManagerResult<CallStats> {
        let calls = self.store.list_calls_since(establishment_id, since).await?;
        Ok(CallStats::from_calls(&calls))
    }
}

#[cfg(test)]
mod tests;
