//! Lifecycle events
//!
//! Every successful mutation through [`CallsManager`] is broadcast as a
//! [`CallEvent`]. Events only describe what this process changed; they are
//! hints for optimistic UI updates, the next snapshot stays authoritative.
//!
//! [`CallsManager`]: super::manager::CallsManager

use serde::{Deserialize, Serialize};
use shared::models::{CallId, CallType, TableNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallEventKind {
    CallAdded,
    CallAttended,
    CallCanceled,
    TableViewed,
    TableClosed,
    WorkdayClosed,
    SettingsUpdated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Event ID (UUID)
    pub event_id: String,
    pub establishment_id: String,
    pub kind: CallEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_type: Option<CallType>,
    /// Calls whose status changed (empty for settings updates)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_ids: Vec<CallId>,
    /// 事件时间戳 (毫秒)
    pub timestamp: i64,
}

impl CallEvent {
    pub fn new(establishment_id: &str, kind: CallEventKind, timestamp: i64) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            establishment_id: establishment_id.to_string(),
            kind,
            table: None,
            call_type: None,
            call_ids: Vec::new(),
            timestamp,
        }
    }

    pub fn with_table(mut self, table: &TableNumber) -> Self {
        self.table = Some(table.clone());
        self
    }

    pub fn with_call_type(mut self, call_type: CallType) -> Self {
        self.call_type = Some(call_type);
        self
    }

    pub fn with_calls(mut self, call_ids: Vec<CallId>) -> Self {
        self.call_ids = call_ids;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_omits_empty_fields() {
        let event = CallEvent::new("E1", CallEventKind::SettingsUpdated, 1_000);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "SETTINGS_UPDATED");
        assert!(json.get("table").is_none());
        assert!(json.get("call_ids").is_none());
    }

    #[test]
    fn test_event_builder() {
        let table = TableNumber::parse("7").unwrap();
        let event = CallEvent::new("E1", CallEventKind::CallAttended, 5)
            .with_table(&table)
            .with_call_type(CallType::Waiter)
            .with_calls(vec![CallId(3)]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["table"], "7");
        assert_eq!(json["call_type"], "WAITER");
        assert_eq!(json["call_ids"], serde_json::json!([3]));
    }
}
