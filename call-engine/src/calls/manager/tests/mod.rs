use super::*;
use crate::calls::memory::MemoryCallStore;
use crate::utils::ManualClock;
use shared::models::Call;

const EST: &str = "E1";

struct Harness {
    manager: CallsManager,
    store: Arc<MemoryCallStore>,
    clock: Arc<ManualClock>,
}

fn create_test_manager() -> Harness {
    let clock = ManualClock::at(0);
    let store = Arc::new(MemoryCallStore::new(clock.clone()));
    store.register_establishment(EST, Some(Settings::default()));
    let manager = CallsManager::new(store.clone(), clock.clone());
    Harness {
        manager,
        store,
        clock,
    }
}

// ========================================================================
// Helpers
// ========================================================================

/// Add a call at `at_secs` on the manual clock
async fn add_call_at(h: &Harness, table: &str, call_type: CallType, at_secs: i64) -> CallId {
    h.clock.set(at_secs * 1000);
    h.manager.add_call(EST, table, call_type).await.unwrap()
}

async fn active_at(h: &Harness, table: &str) -> Vec<Call> {
    let table = TableNumber::parse(table).unwrap();
    h.store
        .list_active_calls(EST, Some(&table), None)
        .await
        .unwrap()
}

async fn active_count(h: &Harness, table: &str, call_type: CallType) -> usize {
    active_at(h, table)
        .await
        .iter()
        .filter(|c| c.call_type == call_type)
        .count()
}

fn status_of(h: &Harness, id: CallId) -> CallStatus {
    h.store
        .all_calls(EST)
        .into_iter()
        .find(|c| c.id == id)
        .map(|c| c.status)
        .unwrap()
}

mod test_lifecycle;
mod test_settings;
