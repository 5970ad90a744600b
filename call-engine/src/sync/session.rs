//! Session - one logged-in subject and its sync loop
//!
//! The session decides which establishments are "of interest" (the one the
//! owner runs, or every favorite of a customer), runs a [`SyncWorker`] for
//! them and routes lifecycle operations through the [`CallsManager`] so
//! each write is followed by a confirmatory refetch under the
//! establishment's in-flight guard.
//!
//! # Lifecycle
//!
//! ```text
//! start(subject) ─► SyncWorker (child token)
//!     │                 ▲
//!     ├─ start(other) ──┘ previous loop cancelled, new one spawned
//!     ├─ stop()          loop cancelled, in-flight results discarded
//!     └─ logout()        stop + clear owner heartbeat + clear cache
//! ```

use super::indicator::SyncState;
use super::worker::{SyncContext, SyncPlan, SyncWorker};
use crate::calls::manager::{CallsManager, ManagerResult};
use parking_lot::Mutex;
use shared::models::{CallId, CallType, CustomerProfile, EstablishmentSnapshot, Settings, SettingsInput};
use shared::status::{self, EstablishmentBoard};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Who is logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSubject {
    /// Staff of one establishment
    Owner { establishment_id: String },
    /// Customer following their favorites
    Customer(CustomerProfile),
}

impl SessionSubject {
    pub fn owner(establishment_id: impl Into<String>) -> Self {
        SessionSubject::Owner {
            establishment_id: establishment_id.into(),
        }
    }

    pub fn owned_establishment(&self) -> Option<&str> {
        match self {
            SessionSubject::Owner { establishment_id } => Some(establishment_id),
            SessionSubject::Customer(_) => None,
        }
    }

    pub fn plan(&self) -> SyncPlan {
        match self {
            SessionSubject::Owner { establishment_id } => SyncPlan {
                establishments: vec![establishment_id.clone()],
                owned: Some(establishment_id.clone()),
            },
            SessionSubject::Customer(profile) => SyncPlan {
                establishments: profile.favorites.iter().cloned().collect(),
                owned: None,
            },
        }
    }
}

struct ActiveLoop {
    subject: SessionSubject,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Session {
    id: String,
    ctx: Arc<SyncContext>,
    manager: Arc<CallsManager>,
    shutdown: CancellationToken,
    active: Mutex<Option<ActiveLoop>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("subject", &self.subject())
            .finish()
    }
}

impl Session {
    /// `shutdown` is the process-wide token; every loop runs on a child of it
    pub fn new(
        ctx: Arc<SyncContext>,
        manager: Arc<CallsManager>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ctx,
            manager,
            shutdown,
            active: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn manager(&self) -> &Arc<CallsManager> {
        &self.manager
    }

    pub fn context(&self) -> &Arc<SyncContext> {
        &self.ctx
    }

    pub fn subject(&self) -> Option<SessionSubject> {
        self.active.lock().as_ref().map(|a| a.subject.clone())
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|a| !a.handle.is_finished())
    }

    // ========== Loop lifecycle ==========

    /// Bind the session to a subject and (re)start its sync loop
    pub fn start(&self, subject: SessionSubject) {
        let plan = subject.plan();
        let mut active = self.active.lock();
        // old loop first, so it cannot repopulate what is pruned below
        if let Some(previous) = active.take() {
            previous.token.cancel();
        }
        self.ctx.cache.retain(&plan.establishments);
        self.ctx.indicator.retain(&plan.establishments);

        let token = self.shutdown.child_token();
        let worker = SyncWorker::new(self.ctx.clone(), plan, token.clone());
        let handle = tokio::spawn(worker.run());

        tracing::info!(session_id = %self.id, subject = ?subject, "Session started");
        *active = Some(ActiveLoop {
            subject,
            token,
            handle,
        });
    }

    /// Stop the loop. A fetch already in flight completes but is not applied.
    pub fn stop(&self) {
        if let Some(active) = self.active.lock().take() {
            active.token.cancel();
            tracing::info!(session_id = %self.id, "Session stopped");
        }
    }

    /// End the session. An owner's establishment is marked closed.
    pub async fn logout(&self) -> ManagerResult<()> {
        let subject = self.subject();
        self.stop();
        self.ctx.cache.clear();
        self.ctx.indicator.clear_issues();

        if let Some(id) = subject.as_ref().and_then(SessionSubject::owned_establishment) {
            self.manager.heartbeat(id, false).await?;
            tracing::info!(session_id = %self.id, establishment_id = %id, "Owner logged out");
        }
        Ok(())
    }

    fn current_token(&self) -> CancellationToken {
        self.active
            .lock()
            .as_ref()
            .map(|a| a.token.clone())
            .unwrap_or_else(|| self.shutdown.child_token())
    }

    // ========== Reads ==========

    /// Refetch one establishment now, waiting for any fetch in flight
    pub async fn refresh(&self, establishment_id: &str) -> bool {
        let _permit = self.ctx.guards.acquire(establishment_id).await;
        let token = self.current_token();
        self.ctx.refresh(establishment_id, false, &token).await
    }

    pub fn snapshot(&self, establishment_id: &str) -> Option<Arc<EstablishmentSnapshot>> {
        self.ctx.cache.get(establishment_id)
    }

    /// Board of one establishment from the cached snapshot, evaluated now
    pub fn board(&self, establishment_id: &str) -> Option<EstablishmentBoard> {
        let snapshot = self.ctx.cache.get(establishment_id)?;
        Some(status::board(
            &snapshot,
            self.ctx.clock.now_millis(),
            self.ctx.config.heartbeat_stale_millis(),
        ))
    }

    /// Boards of every establishment of interest that has been fetched
    pub fn boards(&self) -> Vec<EstablishmentBoard> {
        self.subject()
            .map(|s| s.plan().establishments)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.board(id))
            .collect()
    }

    pub fn sync_state(&self) -> watch::Receiver<SyncState> {
        self.ctx.indicator.subscribe()
    }

    // ========== Lifecycle operations ==========

    /// Run a write, then refetch, both under the establishment's guard
    async fn mutate<T, F>(&self, establishment_id: &str, op: F) -> ManagerResult<T>
    where
        F: Future<Output = ManagerResult<T>>,
    {
        let _permit = self.ctx.guards.acquire(establishment_id).await;
        let value = op.await?;
        let token = self.current_token();
        self.ctx.refresh(establishment_id, false, &token).await;
        Ok(value)
    }

    pub async fn add_call(
        &self,
        establishment_id: &str,
        table: &str,
        call_type: CallType,
    ) -> ManagerResult<CallId> {
        self.mutate(
            establishment_id,
            self.manager.add_call(establishment_id, table, call_type),
        )
        .await
    }

    pub async fn attend_oldest_call_by_type(
        &self,
        establishment_id: &str,
        table: &str,
        call_type: CallType,
    ) -> ManagerResult<Option<CallId>> {
        self.mutate(
            establishment_id,
            self.manager
                .attend_oldest_call_by_type(establishment_id, table, call_type),
        )
        .await
    }

    pub async fn cancel_oldest_call_by_type(
        &self,
        establishment_id: &str,
        table: &str,
        call_type: CallType,
    ) -> ManagerResult<Option<CallId>> {
        self.mutate(
            establishment_id,
            self.manager
                .cancel_oldest_call_by_type(establishment_id, table, call_type),
        )
        .await
    }

    pub async fn view_all_calls_for_table(
        &self,
        establishment_id: &str,
        table: &str,
    ) -> ManagerResult<usize> {
        self.mutate(
            establishment_id,
            self.manager.view_all_calls_for_table(establishment_id, table),
        )
        .await
    }

    pub async fn close_table(&self, establishment_id: &str, table: &str) -> ManagerResult<usize> {
        self.mutate(
            establishment_id,
            self.manager.close_table(establishment_id, table),
        )
        .await
    }

    /// Close the workday. If this session owns the establishment its loop
    /// stops too, so the heartbeat does not reopen it; `start` begins the
    /// next shift.
    ///
    /// The loop is only stopped once the close went through. A failed close
    /// leaves it running and the establishment keeps syncing.
    pub async fn close_establishment_workday(&self, establishment_id: &str) -> ManagerResult<usize> {
        let _permit = self.ctx.guards.acquire(establishment_id).await;
        let canceled = self
            .manager
            .close_establishment_workday(establishment_id)
            .await?;

        // still holding the permit: no heartbeat can slip in before the stop
        let owns = self
            .subject()
            .is_some_and(|s| s.owned_establishment() == Some(establishment_id));
        if owns {
            self.stop();
        }
        let token = self.current_token();
        self.ctx.refresh(establishment_id, false, &token).await;
        Ok(canceled)
    }

    pub async fn update_settings(
        &self,
        establishment_id: &str,
        input: SettingsInput,
    ) -> ManagerResult<Settings> {
        self.mutate(
            establishment_id,
            self.manager.update_settings(establishment_id, input),
        )
        .await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.token.cancel();
        }
    }
}
