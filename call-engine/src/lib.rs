//! Call Engine - 餐桌呼叫生命周期与信号灯状态引擎
//!
//! # 架构概述
//!
//! - **呼叫** (`calls`): 存储接口、生命周期控制器、事件广播
//! - **同步** (`sync`): 周期同步循环、快照缓存、单飞保护、会话
//! - **核心** (`core`): 配置、后台任务
//! - **工具** (`utils`): 时钟、日志
//!
//! 信号灯计算本身是纯函数, 位于 `shared::status`。
//!
//! # 模块结构
//!
//! ```text
//! call-engine/src/
//! ├── calls/         # CallStore, CallsManager, CallEvent
//! ├── sync/          # SyncWorker, SnapshotCache, Session
//! ├── core/          # Config, BackgroundTasks
//! └── utils/         # Clock, logger
//! ```

pub mod calls;
pub mod core;
pub mod sync;
pub mod utils;

// Re-export 公共类型
pub use calls::{CallEvent, CallSelector, CallStore, CallsManager, MemoryCallStore, StoreError};
pub use core::{BackgroundTasks, Config, SyncConfig, TaskKind};
pub use sync::{Session, SessionSubject, SyncContext, SyncState, SyncWorker};
pub use utils::{Clock, ManualClock, SystemClock};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Initialize logging from `config` (JSON console output in production)
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    init_logger_with_file(
        &config.log_level,
        config.log_json || config.is_production(),
        config.log_dir.as_deref(),
    )
}
