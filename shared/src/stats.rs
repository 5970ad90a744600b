//! Historical call statistics
//!
//! Calls are never deleted, so the full history of an establishment can be
//! folded into counters per type and status.

use crate::models::{Call, CallStatus, CallType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters for one call type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub sent: usize,
    pub viewed: usize,
    pub attended: usize,
    pub canceled: usize,
}

impl StatusCounts {
    fn record(&mut self, status: CallStatus) {
        match status {
            CallStatus::Sent => self.sent += 1,
            CallStatus::Viewed => self.viewed += 1,
            CallStatus::Attended => self.attended += 1,
            CallStatus::Canceled => self.canceled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.sent + self.viewed + self.attended + self.canceled
    }

    pub fn active(&self) -> usize {
        self.sent + self.viewed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStats {
    pub by_type: BTreeMap<CallType, StatusCounts>,
    /// Earliest call in the aggregated range (Unix millis)
    pub first_call_at: Option<i64>,
    /// Latest call in the aggregated range (Unix millis)
    pub last_call_at: Option<i64>,
}

impl CallStats {
    pub fn from_calls<'a>(calls: impl IntoIterator<Item = &'a Call>) -> Self {
        let mut stats = Self::default();
        for call in calls {
            stats
                .by_type
                .entry(call.call_type)
                .or_default()
                .record(call.status);
            stats.first_call_at = Some(
                stats
                    .first_call_at
                    .map_or(call.created_at, |t| t.min(call.created_at)),
            );
            stats.last_call_at = Some(
                stats
                    .last_call_at
                    .map_or(call.created_at, |t| t.max(call.created_at)),
            );
        }
        stats
    }

    pub fn counts(&self, call_type: CallType) -> StatusCounts {
        self.by_type.get(&call_type).copied().unwrap_or_default()
    }

    /// Totals across all call types
    pub fn totals(&self) -> StatusCounts {
        self.by_type
            .values()
            .fold(StatusCounts::default(), |acc, c| StatusCounts {
                sent: acc.sent + c.sent,
                viewed: acc.viewed + c.viewed,
                attended: acc.attended + c.attended,
                canceled: acc.canceled + c.canceled,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallId, TableNumber};

    fn call(id: i64, call_type: CallType, status: CallStatus) -> Call {
        Call {
            id: CallId(id),
            table_number: TableNumber::parse("1").unwrap(),
            call_type,
            status,
            created_at: id * 100,
        }
    }

    #[test]
    fn test_from_calls() {
        let calls = vec![
            call(1, CallType::Waiter, CallStatus::Attended),
            call(2, CallType::Waiter, CallStatus::Canceled),
            call(3, CallType::Bill, CallStatus::Sent),
            call(4, CallType::Waiter, CallStatus::Viewed),
        ];
        let stats = CallStats::from_calls(&calls);

        let waiter = stats.counts(CallType::Waiter);
        assert_eq!(waiter.attended, 1);
        assert_eq!(waiter.canceled, 1);
        assert_eq!(waiter.active(), 1);
        assert_eq!(stats.counts(CallType::Menu), StatusCounts::default());
        assert_eq!(stats.totals().total(), 4);
        assert_eq!(stats.first_call_at, Some(100));
        assert_eq!(stats.last_call_at, Some(400));
    }

    #[test]
    fn test_empty_history() {
        let stats = CallStats::from_calls(&Vec::<Call>::new());
        assert_eq!(stats.totals().total(), 0);
        assert!(stats.first_call_at.is_none());
    }
}
