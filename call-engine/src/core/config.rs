use std::time::Duration;

/// Shortest allowed sync period
pub const MIN_SYNC_INTERVAL_SECS: u64 = 20;
/// Longest allowed sync period
pub const MAX_SYNC_INTERVAL_SECS: u64 = 30;

/// 引擎配置 - 会话运行所需的全部配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | SYNC_INTERVAL_SECS | 25 | 同步周期 (20..=30) |
/// | SYNC_INDICATOR_LINGER_MS | 1000 | 同步完成后"更新中"提示的最短保留时间 |
/// | HEARTBEAT_STALE_SECS | 90 | 心跳超过该时长视为已打烊 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | LOG_DIR | (unset) | 文件日志目录 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DEMO_ESTABLISHMENT_ID | E1 | 演示会话所属门店 |
///
/// # 示例
///
/// ```ignore
/// SYNC_INTERVAL_SECS=20 LOG_LEVEL=debug cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 同步周期 (秒)
    pub sync_interval_secs: u64,
    /// "更新中"提示保留时间 (毫秒)
    pub indicator_linger_ms: u64,
    /// 心跳过期时间 (秒)
    pub heartbeat_stale_secs: u64,
    /// 日志级别
    pub log_level: String,
    /// JSON 日志
    pub log_json: bool,
    /// 文件日志目录
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 演示会话所属门店
    pub demo_establishment_id: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            sync_interval_secs: std::env::var("SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25),
            indicator_linger_ms: std::env::var("SYNC_INDICATOR_LINGER_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            heartbeat_stale_secs: std::env::var("HEARTBEAT_STALE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(90),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            demo_establishment_id: std::env::var("DEMO_ESTABLISHMENT_ID")
                .unwrap_or_else(|_| "E1".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new(
            Duration::from_secs(self.sync_interval_secs),
            Duration::from_millis(self.indicator_linger_ms),
            Duration::from_secs(self.heartbeat_stale_secs),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Timing parameters of the synchronization loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Period between sync cycles
    pub interval: Duration,
    /// Minimum time the updating flag stays on after a fetch completes
    pub indicator_linger: Duration,
    /// Heartbeat age after which an establishment reads as closed
    pub heartbeat_stale: Duration,
}

impl SyncConfig {
    /// Interval is clamped to 20..=30 seconds; linger is at least 1 second
    pub fn new(interval: Duration, indicator_linger: Duration, heartbeat_stale: Duration) -> Self {
        Self {
            interval: interval.clamp(
                Duration::from_secs(MIN_SYNC_INTERVAL_SECS),
                Duration::from_secs(MAX_SYNC_INTERVAL_SECS),
            ),
            indicator_linger: indicator_linger.max(Duration::from_secs(1)),
            heartbeat_stale,
        }
    }

    pub fn heartbeat_stale_millis(&self) -> i64 {
        i64::try_from(self.heartbeat_stale.as_millis()).unwrap_or(i64::MAX)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(25),
            Duration::from_secs(1),
            Duration::from_secs(90),
        )
    }
}
