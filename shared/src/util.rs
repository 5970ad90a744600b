/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds elapsed from `since` to `now`, clamped at zero.
///
/// A call stamped slightly in the future (clock skew between devices)
/// counts as just created rather than producing a negative age.
pub fn elapsed_millis(since: i64, now: i64) -> i64 {
    now.saturating_sub(since).max(0)
}

/// Whole seconds elapsed from `since` to `now`, clamped at zero.
pub fn elapsed_secs(since: i64, now: i64) -> i64 {
    elapsed_millis(since, now) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_clamps_future_timestamps() {
        assert_eq!(elapsed_millis(5_000, 2_000), 0);
        assert_eq!(elapsed_secs(5_000, 2_000), 0);
    }

    #[test]
    fn test_elapsed_secs_truncates() {
        assert_eq!(elapsed_secs(0, 59_999), 59);
        assert_eq!(elapsed_secs(0, 60_000), 60);
    }
}
