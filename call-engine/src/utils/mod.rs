//! 工具模块 - 时钟、日志

pub mod clock;
pub mod logger;

pub use clock::{Clock, ManualClock, SystemClock};
