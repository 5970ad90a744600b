//! 核心模块 - 配置与后台任务
//!
//! - [`Config`] - 引擎配置 (环境变量)
//! - [`SyncConfig`] - 同步循环时间参数
//! - [`BackgroundTasks`] - 后台任务管理器

pub mod config;
pub mod tasks;

pub use config::{Config, SyncConfig};
pub use tasks::{BackgroundTasks, TaskKind};
