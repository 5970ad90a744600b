//! Call Model

use super::table::TableNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned call identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub i64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 呼叫类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallType {
    /// 呼叫服务员
    Waiter,
    /// 请求菜单
    Menu,
    /// 请求结账
    Bill,
}

impl CallType {
    /// Every call type, in display order
    pub const ALL: [CallType; 3] = [CallType::Waiter, CallType::Menu, CallType::Bill];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Waiter => "WAITER",
            CallType::Menu => "MENU",
            CallType::Bill => "BILL",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 呼叫状态
///
/// ```text
/// SENT ──► VIEWED ──► ATTENDED
///   │         │
///   ├─────────┼──────► ATTENDED (direct resolution)
///   └─────────┴──────► CANCELED
/// ```
///
/// `Attended` and `Canceled` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Sent,
    Viewed,
    Attended,
    Canceled,
}

impl CallStatus {
    /// Statuses that count as "active" (not yet resolved)
    pub const ACTIVE: [CallStatus; 2] = [CallStatus::Sent, CallStatus::Viewed];

    #[inline]
    pub const fn is_active(self) -> bool {
        matches!(self, CallStatus::Sent | CallStatus::Viewed)
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// Canonical transition function for every consumer of call status.
    ///
    /// Returns the new status when `from -> to` is a legal move, `None` when
    /// the request must be ignored: the call is already terminal, the move
    /// goes backwards (`Viewed -> Sent`), or it would not change anything.
    pub const fn transition(from: CallStatus, to: CallStatus) -> Option<CallStatus> {
        match (from, to) {
            (CallStatus::Sent, CallStatus::Viewed)
            | (CallStatus::Sent, CallStatus::Attended)
            | (CallStatus::Sent, CallStatus::Canceled)
            | (CallStatus::Viewed, CallStatus::Attended)
            | (CallStatus::Viewed, CallStatus::Canceled) => Some(to),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Sent => "SENT",
            CallStatus::Viewed => "VIEWED",
            CallStatus::Attended => "ATTENDED",
            CallStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single customer service request
///
/// Immutable except `status`, which only the store mutates and only
/// through [`CallStatus::transition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub id: CallId,
    pub table_number: TableNumber,
    pub call_type: CallType,
    pub status: CallStatus,
    /// Creation time (Unix millis)
    pub created_at: i64,
}

impl Call {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Apply a status change in place. Returns `true` if the status changed.
    pub fn apply_status(&mut self, to: CallStatus) -> bool {
        match CallStatus::transition(self.status, to) {
            Some(next) => {
                self.status = next;
                true
            }
            None => false,
        }
    }
}
