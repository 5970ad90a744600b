//! In-process call store
//!
//! Reference [`CallStore`] backed by a `parking_lot::RwLock`. Used by the
//! demo binary and the tests; it also supports fault injection (offline
//! mode, failing the next N operations, slow snapshot reads) so sync
//! failure paths can be exercised deterministically.

use super::store::{CallSelector, CallStore, StoreError, StoreResult};
use crate::utils::Clock;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared::models::{Call, CallId, CallStatus, CallType, EstablishmentSnapshot, Settings, TableNumber};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct EstablishmentRecord {
    settings: Option<Settings>,
    is_open: bool,
    heartbeat_at: Option<i64>,
    /// Insertion order; never truncated
    calls: Vec<Call>,
}

#[derive(Debug, Default)]
struct Faults {
    offline: AtomicBool,
    fail_next: AtomicU32,
    heartbeat_down: AtomicBool,
    snapshot_delay: Mutex<Option<Duration>>,
}

/// Operation counters, for asserting what the engine actually did
#[derive(Debug, Default)]
pub struct StoreCounters {
    pub snapshot_reads: AtomicU64,
    pub heartbeat_writes: AtomicU64,
    pub status_updates: AtomicU64,
}

pub struct MemoryCallStore {
    establishments: RwLock<HashMap<String, EstablishmentRecord>>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
    faults: Faults,
    counters: StoreCounters,
}

impl std::fmt::Debug for MemoryCallStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCallStore")
            .field("establishments", &self.establishments.read().len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl MemoryCallStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            establishments: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            clock,
            faults: Faults::default(),
            counters: StoreCounters::default(),
        }
    }

    /// Create (or reset the settings of) an establishment
    pub fn register_establishment(&self, establishment_id: &str, settings: Option<Settings>) {
        self.establishments
            .write()
            .entry(establishment_id.to_string())
            .or_default()
            .settings = settings;
    }

    // ========== Fault injection ==========

    /// While offline every operation fails with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.faults.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail the next `n` operations
    pub fn fail_next(&self, n: u32) {
        self.faults.fail_next.store(n, Ordering::SeqCst);
    }

    /// Fail heartbeat writes only; every other operation keeps working
    pub fn set_heartbeat_failing(&self, failing: bool) {
        self.faults.heartbeat_down.store(failing, Ordering::SeqCst);
    }

    /// Delay every snapshot read (to hold a fetch in flight)
    pub fn set_snapshot_delay(&self, delay: Option<Duration>) {
        *self.faults.snapshot_delay.lock() = delay;
    }

    pub fn counters(&self) -> &StoreCounters {
        &self.counters
    }

    /// Every call ever stored for an establishment, insertion order
    pub fn all_calls(&self, establishment_id: &str) -> Vec<Call> {
        self.establishments
            .read()
            .get(establishment_id)
            .map(|r| r.calls.clone())
            .unwrap_or_default()
    }

    fn check_faults(&self) -> StoreResult<()> {
        if self.faults.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        let consumed = self
            .faults
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn with_record<T>(
        &self,
        establishment_id: &str,
        f: impl FnOnce(&EstablishmentRecord) -> T,
    ) -> StoreResult<T> {
        let establishments = self.establishments.read();
        let record = establishments
            .get(establishment_id)
            .ok_or_else(|| StoreError::EstablishmentNotFound(establishment_id.to_string()))?;
        Ok(f(record))
    }

    fn with_record_mut<T>(
        &self,
        establishment_id: &str,
        f: impl FnOnce(&mut EstablishmentRecord) -> T,
    ) -> StoreResult<T> {
        let mut establishments = self.establishments.write();
        let record = establishments
            .get_mut(establishment_id)
            .ok_or_else(|| StoreError::EstablishmentNotFound(establishment_id.to_string()))?;
        Ok(f(record))
    }
}

/// Active calls sorted by `created_at`; the stable sort keeps insertion order on ties
fn active_sorted<'a>(calls: impl Iterator<Item = &'a Call>) -> Vec<Call> {
    let mut active: Vec<Call> = calls.filter(|c| c.is_active()).cloned().collect();
    active.sort_by_key(|c| c.created_at);
    active
}

#[async_trait]
impl CallStore for MemoryCallStore {
    async fn insert_call(
        &self,
        establishment_id: &str,
        table: &TableNumber,
        call_type: CallType,
        status: CallStatus,
        created_at: i64,
    ) -> StoreResult<CallId> {
        self.check_faults()?;
        self.with_record_mut(establishment_id, |record| {
            let id = CallId(self.next_id.fetch_add(1, Ordering::SeqCst));
            record.calls.push(Call {
                id,
                table_number: table.clone(),
                call_type,
                status,
                created_at,
            });
            id
        })
    }

    async fn list_active_calls(
        &self,
        establishment_id: &str,
        table: Option<&TableNumber>,
        call_type: Option<CallType>,
    ) -> StoreResult<Vec<Call>> {
        self.check_faults()?;
        self.with_record(establishment_id, |record| {
            active_sorted(record.calls.iter().filter(|c| {
                table.is_none_or(|t| &c.table_number == t)
                    && call_type.is_none_or(|ty| c.call_type == ty)
            }))
        })
    }

    async fn update_call_status(
        &self,
        establishment_id: &str,
        selector: CallSelector,
        new_status: CallStatus,
    ) -> StoreResult<Vec<CallId>> {
        self.check_faults()?;
        self.counters.status_updates.fetch_add(1, Ordering::Relaxed);
        self.with_record_mut(establishment_id, |record| {
            if let CallSelector::Id(id) = &selector {
                if !record.calls.iter().any(|c| &c.id == id) {
                    return Err(StoreError::CallNotFound(*id));
                }
            }

            let changed = record
                .calls
                .iter_mut()
                .filter(|c| match &selector {
                    CallSelector::Id(id) => &c.id == id,
                    CallSelector::Table(table) => &c.table_number == table,
                    CallSelector::Establishment => true,
                })
                .filter_map(|c| c.apply_status(new_status).then_some(c.id))
                .collect();
            Ok(changed)
        })?
    }

    async fn get_establishment_snapshot(
        &self,
        establishment_id: &str,
    ) -> StoreResult<EstablishmentSnapshot> {
        self.check_faults()?;
        self.counters.snapshot_reads.fetch_add(1, Ordering::Relaxed);

        let delay = *self.faults.snapshot_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let fetched_at = self.clock.now_millis();
        self.with_record(establishment_id, |record| EstablishmentSnapshot {
            establishment_id: establishment_id.to_string(),
            settings: record.settings,
            is_open: record.is_open,
            heartbeat_at: record.heartbeat_at,
            calls: active_sorted(record.calls.iter()),
            fetched_at,
        })
    }

    async fn set_heartbeat(&self, establishment_id: &str, is_open: bool, at: i64) -> StoreResult<()> {
        self.check_faults()?;
        if self.faults.heartbeat_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("heartbeat rejected".to_string()));
        }
        self.counters.heartbeat_writes.fetch_add(1, Ordering::Relaxed);
        self.with_record_mut(establishment_id, |record| {
            record.is_open = is_open;
            record.heartbeat_at = Some(at);
        })
    }

    async fn save_settings(&self, establishment_id: &str, settings: Settings) -> StoreResult<()> {
        self.check_faults()?;
        self.with_record_mut(establishment_id, |record| {
            record.settings = Some(settings);
        })
    }

    async fn list_calls_since(&self, establishment_id: &str, since: i64) -> StoreResult<Vec<Call>> {
        self.check_faults()?;
        self.with_record(establishment_id, |record| {
            record
                .calls
                .iter()
                .filter(|c| c.created_at >= since)
                .cloned()
                .collect()
        })
    }
}
