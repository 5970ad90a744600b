//! Snapshot cache
//!
//! One entry per establishment of interest. Entries are immutable
//! `Arc<EstablishmentSnapshot>`s swapped wholesale, so a reader holding an
//! entry never observes a partially applied refresh.

use parking_lot::RwLock;
use shared::models::EstablishmentSnapshot;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: RwLock<HashMap<String, Arc<EstablishmentSnapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, establishment_id: &str) -> Option<Arc<EstablishmentSnapshot>> {
        self.entries.read().get(establishment_id).cloned()
    }

    /// Swap in a fresh snapshot.
    ///
    /// A snapshot read before the cached one is dropped so the local view
    /// never moves backwards. Returns whether the entry was replaced.
    pub fn replace(&self, snapshot: EstablishmentSnapshot) -> bool {
        let mut entries = self.entries.write();
        let stale = entries
            .get(&snapshot.establishment_id)
            .filter(|current| current.fetched_at > snapshot.fetched_at);
        if let Some(current) = stale {
            tracing::debug!(
                establishment_id = %snapshot.establishment_id,
                cached_at = current.fetched_at,
                fetched_at = snapshot.fetched_at,
                "Dropping out-of-order snapshot"
            );
            return false;
        }
        entries.insert(snapshot.establishment_id.clone(), Arc::new(snapshot));
        true
    }

    /// Keep only the listed establishments
    pub fn retain(&self, establishment_ids: &[String]) {
        self.entries
            .write()
            .retain(|id, _| establishment_ids.contains(id));
    }

    pub fn remove(&self, establishment_id: &str) -> Option<Arc<EstablishmentSnapshot>> {
        self.entries.write().remove(establishment_id)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
