//! Synchronization
//!
//! - [`cache`] - 门店快照缓存 (整体替换)
//! - [`guard`] - 每门店单飞保护
//! - [`indicator`] - "更新中" / 同步异常提示
//! - [`worker`] - 周期同步循环
//! - [`session`] - 会话: 关注门店、生命周期操作与确认性重取

pub mod cache;
pub mod guard;
pub mod indicator;
pub mod session;
pub mod worker;

pub use cache::SnapshotCache;
pub use guard::{FetchGuards, FetchPermit};
pub use indicator::{SyncIndicator, SyncState};
pub use session::{Session, SessionSubject};
pub use worker::{SyncContext, SyncPlan, SyncWorker};
