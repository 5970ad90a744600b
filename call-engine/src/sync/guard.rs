//! Per-establishment in-flight guard
//!
//! At most one snapshot fetch (periodic, or a mutation plus its
//! confirmatory refetch) runs per establishment. The periodic loop skips an
//! establishment that is busy; user mutations wait for their turn.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held while a fetch is in flight; dropping it frees the slot
#[derive(Debug)]
pub struct FetchPermit {
    _guard: OwnedMutexGuard<()>,
}

#[derive(Debug, Default)]
pub struct FetchGuards {
    slots: DashMap<String, Arc<Mutex<()>>>,
}

impl FetchGuards {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, establishment_id: &str) -> Arc<Mutex<()>> {
        // 先释放 DashMap 分片锁, 再等待
        self.slots
            .entry(establishment_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Take the slot if it is free
    pub fn try_acquire(&self, establishment_id: &str) -> Option<FetchPermit> {
        self.slot(establishment_id)
            .try_lock_owned()
            .ok()
            .map(|guard| FetchPermit { _guard: guard })
    }

    /// Wait for the slot
    pub async fn acquire(&self, establishment_id: &str) -> FetchPermit {
        let guard = self.slot(establishment_id).lock_owned().await;
        FetchPermit { _guard: guard }
    }

    pub fn is_in_flight(&self, establishment_id: &str) -> bool {
        self.slots
            .get(establishment_id)
            .is_some_and(|slot| slot.try_lock().is_err())
    }
}
