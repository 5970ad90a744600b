//! Sync indicator
//!
//! Watchable state for the UI: an "updating" flag that stays on for at least
//! the configured linger after each fetch, plus the last sync issue per
//! establishment. Issues never block anything; a successful fetch of the
//! same establishment clears its entry, and so does dropping the
//! establishment from the session's interest.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// A fetch is running or finished less than the linger ago
    pub updating: bool,
    /// Last failure per establishment
    pub issues: BTreeMap<String, String>,
    /// Last successful fetch (Unix millis)
    pub last_synced_at: Option<i64>,
    pending: usize,
}

impl SyncState {
    pub fn has_issue(&self) -> bool {
        !self.issues.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SyncIndicator {
    tx: Arc<watch::Sender<SyncState>>,
    linger: Duration,
}

impl SyncIndicator {
    pub fn new(linger: Duration) -> Self {
        let (tx, _) = watch::channel(SyncState::default());
        Self {
            tx: Arc::new(tx),
            linger,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> SyncState {
        self.tx.borrow().clone()
    }

    pub fn fetch_started(&self) {
        self.tx.send_modify(|s| {
            s.pending += 1;
            s.updating = true;
        });
    }

    /// Record the outcome now; the updating flag clears after the linger
    pub fn fetch_finished(&self, establishment_id: &str, outcome: Result<i64, String>) {
        self.tx.send_modify(|s| match outcome {
            Ok(fetched_at) => {
                s.issues.remove(establishment_id);
                s.last_synced_at = Some(s.last_synced_at.map_or(fetched_at, |t| t.max(fetched_at)));
            }
            Err(issue) => {
                s.issues.insert(establishment_id.to_string(), issue);
            }
        });
        self.schedule_clear();
    }

    /// A fetch whose result was thrown away; only the updating flag is affected
    pub fn fetch_discarded(&self) {
        self.schedule_clear();
    }

    /// Forget issues of establishments no longer followed
    pub fn retain(&self, establishment_ids: &[String]) {
        self.tx.send_if_modified(|s| {
            let before = s.issues.len();
            s.issues.retain(|id, _| establishment_ids.contains(id));
            s.issues.len() != before
        });
    }

    pub fn clear_issues(&self) {
        self.tx.send_if_modified(|s| {
            let had = !s.issues.is_empty();
            s.issues.clear();
            had
        });
    }

    fn schedule_clear(&self) {
        let tx = self.tx.clone();
        let linger = self.linger;
        tokio::spawn(async move {
            tokio::time::sleep(linger).await;
            tx.send_modify(|s| {
                s.pending = s.pending.saturating_sub(1);
                s.updating = s.pending > 0;
            });
        });
    }
}
