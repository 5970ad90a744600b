//! SyncWorker - periodic synchronization loop
//!
//! Every `interval` the worker refreshes each establishment of interest:
//!
//! ```text
//! cycle
//!     ├─ for each establishment (concurrently)
//!     │    ├─ in-flight? → skip until next cycle
//!     │    ├─ owner: set_heartbeat(open)        (before the read)
//!     │    ├─ get_establishment_snapshot
//!     │    ├─ loop stopped meanwhile? → discard
//!     │    └─ swap into SnapshotCache
//!     └─ wait for next tick (failures never stop the loop)
//! ```

use super::cache::SnapshotCache;
use super::guard::FetchGuards;
use super::indicator::SyncIndicator;
use crate::calls::store::{CallStore, StoreResult};
use crate::core::SyncConfig;
use crate::utils::Clock;
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// State shared by the loop and by user-triggered refetches
pub struct SyncContext {
    pub store: Arc<dyn CallStore>,
    pub clock: Arc<dyn Clock>,
    pub cache: SnapshotCache,
    pub guards: FetchGuards,
    pub indicator: SyncIndicator,
    pub config: SyncConfig,
}

impl SyncContext {
    pub fn new(store: Arc<dyn CallStore>, clock: Arc<dyn Clock>, config: SyncConfig) -> Self {
        Self {
            store,
            clock,
            cache: SnapshotCache::new(),
            guards: FetchGuards::new(),
            indicator: SyncIndicator::new(config.indicator_linger),
            config,
        }
    }

    /// Fetch one establishment and swap it into the cache.
    ///
    /// The caller holds the establishment's [`FetchPermit`]. Returns whether
    /// the cache was updated; failures are logged and recorded on the
    /// indicator, the cached snapshot is left as it was.
    ///
    /// [`FetchPermit`]: super::guard::FetchPermit
    pub async fn refresh(
        &self,
        establishment_id: &str,
        heartbeat: bool,
        token: &CancellationToken,
    ) -> bool {
        self.indicator.fetch_started();
        let result = self.fetch(establishment_id, heartbeat).await;

        // stopped mid-fetch: neither the snapshot nor the failure applies any more
        if token.is_cancelled() {
            tracing::warn!(
                establishment_id = %establishment_id,
                failed = result.is_err(),
                "Sync stopped during fetch, discarding result"
            );
            self.indicator.fetch_discarded();
            return false;
        }

        match result {
            Ok(snapshot) => {
                let fetched_at = snapshot.fetched_at;
                let active = snapshot.calls.len();
                let applied = self.cache.replace(snapshot);
                tracing::debug!(
                    establishment_id = %establishment_id,
                    active_calls = active,
                    applied,
                    "Snapshot refreshed"
                );
                self.indicator.fetch_finished(establishment_id, Ok(fetched_at));
                applied
            }
            Err(e) => {
                tracing::warn!(
                    establishment_id = %establishment_id,
                    error = %e,
                    transient = e.is_transient(),
                    "Snapshot refresh failed, keeping cached copy"
                );
                self.indicator
                    .fetch_finished(establishment_id, Err(e.to_string()));
                false
            }
        }
    }

    async fn fetch(
        &self,
        establishment_id: &str,
        heartbeat: bool,
    ) -> StoreResult<shared::models::EstablishmentSnapshot> {
        if heartbeat {
            self.store
                .set_heartbeat(establishment_id, true, self.clock.now_millis())
                .await?;
        }
        self.store.get_establishment_snapshot(establishment_id).await
    }
}

/// What one loop keeps fresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Establishments of interest
    pub establishments: Vec<String>,
    /// The one this session owns (gets the heartbeat)
    pub owned: Option<String>,
}

impl SyncPlan {
    pub fn sends_heartbeat(&self, establishment_id: &str) -> bool {
        self.owned.as_deref() == Some(establishment_id)
    }
}

pub struct SyncWorker {
    ctx: Arc<SyncContext>,
    plan: SyncPlan,
    shutdown: CancellationToken,
}

impl SyncWorker {
    pub fn new(ctx: Arc<SyncContext>, plan: SyncPlan, shutdown: CancellationToken) -> Self {
        Self {
            ctx,
            plan,
            shutdown,
        }
    }

    /// Run until the token is cancelled.
    ///
    /// The first cycle runs immediately. A cycle that is already running when
    /// the token fires completes, but its results are discarded.
    pub async fn run(self) {
        tracing::info!(
            establishments = ?self.plan.establishments,
            interval_secs = self.ctx.config.interval.as_secs(),
            "SyncWorker started"
        );

        let mut ticker = tokio::time::interval(self.ctx.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    break;
                }

                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        tracing::info!("SyncWorker stopped");
    }

    /// One sync cycle; returns how many establishments were refreshed
    pub async fn run_cycle(&self) -> usize {
        let refreshes = self.plan.establishments.iter().map(|id| async move {
            let Some(_permit) = self.ctx.guards.try_acquire(id) else {
                tracing::debug!(establishment_id = %id, "Fetch in flight, skipping cycle");
                return false;
            };
            self.ctx
                .refresh(id, self.plan.sends_heartbeat(id), &self.shutdown)
                .await
        });

        join_all(refreshes)
            .await
            .into_iter()
            .filter(|applied| *applied)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calls::MemoryCallStore;
    use crate::utils::ManualClock;
    use shared::models::{CallStatus, CallType, TableNumber};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn context() -> (Arc<SyncContext>, Arc<MemoryCallStore>) {
        let clock = ManualClock::at(1_000);
        let store = Arc::new(MemoryCallStore::new(clock.clone()));
        store.register_establishment("E1", None);
        store.register_establishment("E2", None);
        let ctx = Arc::new(SyncContext::new(store.clone(), clock, SyncConfig::default()));
        (ctx, store)
    }

    fn plan(owned: Option<&str>) -> SyncPlan {
        SyncPlan {
            establishments: vec!["E1".to_string(), "E2".to_string()],
            owned: owned.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_cycle_refreshes_every_establishment() {
        let (ctx, store) = context();
        let table = TableNumber::parse("1").unwrap();
        store
            .insert_call("E2", &table, CallType::Waiter, CallStatus::Sent, 0)
            .await
            .unwrap();

        let worker = SyncWorker::new(ctx.clone(), plan(None), CancellationToken::new());
        assert_eq!(worker.run_cycle().await, 2);
        assert_eq!(ctx.cache.get("E2").unwrap().calls.len(), 1);
        assert!(ctx.cache.get("E1").unwrap().calls.is_empty());
        assert_eq!(store.counters().heartbeat_writes.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_owner_sees_own_heartbeat_in_same_cycle() {
        let (ctx, store) = context();
        let worker = SyncWorker::new(ctx.clone(), plan(Some("E1")), CancellationToken::new());
        worker.run_cycle().await;

        assert!(ctx.cache.get("E1").unwrap().is_open);
        assert!(!ctx.cache.get("E2").unwrap().is_open);
        assert_eq!(store.counters().heartbeat_writes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_busy_establishment_is_skipped() {
        let (ctx, store) = context();
        let _permit = ctx.guards.try_acquire("E1").unwrap();

        let worker = SyncWorker::new(ctx.clone(), plan(None), CancellationToken::new());
        assert_eq!(worker.run_cycle().await, 1);
        assert!(ctx.cache.get("E1").is_none());
        assert_eq!(store.counters().snapshot_reads.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_cache() {
        let (ctx, store) = context();
        let worker = SyncWorker::new(ctx.clone(), plan(None), CancellationToken::new());
        worker.run_cycle().await;
        let before = ctx.cache.get("E1").unwrap();

        store.set_offline(true);
        assert_eq!(worker.run_cycle().await, 0);
        assert!(Arc::ptr_eq(&ctx.cache.get("E1").unwrap(), &before));
        assert!(ctx.indicator.state().has_issue());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_discarded_after_stop() {
        let (ctx, store) = context();
        store.set_snapshot_delay(Some(Duration::from_secs(5)));
        let token = CancellationToken::new();
        let worker = SyncWorker::new(ctx.clone(), plan(None), token.clone());

        let cycle = tokio::spawn(async move { worker.run_cycle().await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        assert_eq!(cycle.await.unwrap(), 0);
        assert!(ctx.cache.is_empty());
        assert!(!ctx.indicator.state().has_issue());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_stop_records_no_issue() {
        let (ctx, store) = context();
        store.set_snapshot_delay(Some(Duration::from_secs(5)));
        let token = CancellationToken::new();

        // unknown establishment: the read fails once the delay is over
        let refresh = {
            let ctx = ctx.clone();
            let token = token.clone();
            tokio::spawn(async move { ctx.refresh("E9", false, &token).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        assert!(!refresh.await.unwrap());
        assert!(ctx.cache.is_empty());
        assert!(!ctx.indicator.state().has_issue());
    }
}
