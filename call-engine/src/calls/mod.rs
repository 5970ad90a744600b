//! Call lifecycle
//!
//! - [`store`] - 存储协作者接口 (CallStore)
//! - [`memory`] - 内存存储实现
//! - [`manager`] - 生命周期控制器 (CallsManager)
//! - [`events`] - 生命周期事件广播

pub mod events;
pub mod manager;
pub mod memory;
pub mod store;

pub use events::{CallEvent, CallEventKind};
pub use manager::{CallsManager, ManagerError, ManagerResult};
pub use memory::MemoryCallStore;
pub use store::{CallSelector, CallStore, StoreError, StoreResult};
