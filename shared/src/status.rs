//! Semaphore status engine
//!
//! Pure classification of how urgent a table (or one call type at a table)
//! is, from a call snapshot, the resolved thresholds and the current time.
//! Results depend on `now`, so they are recomputed on every render and
//! never cached across time.
//!
//! | Scope | Reference call | Levels |
//! |-------|----------------|--------|
//! | Table | oldest active call (min `created_at`, first wins ties) | IDLE / GREEN / YELLOW / RED |
//! | Call type | first active call of that type in table order | IDLE / GREEN / RED |
//!
//! The per-type signal is deliberately binary (urgent or not); only the
//! table-level signal has a YELLOW tier. Quantity thresholds are carried
//! for display and do not escalate either signal.
//!
//! Table order is the order of the snapshot's call list. Stores hand calls
//! over sorted by `created_at`, ties kept in insertion order, so the
//! per-type reference call is also the oldest call of that type.

use crate::models::{Call, CallType, EstablishmentSnapshot, Table, TableNumber, Thresholds};
use crate::util::{elapsed_millis, elapsed_secs};
use serde::{Deserialize, Serialize};

/// Four-level urgency classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Semaphore {
    Idle,
    Green,
    Yellow,
    Red,
}

impl Semaphore {
    pub fn is_idle(&self) -> bool {
        matches!(self, Semaphore::Idle)
    }
}

/// Oldest active call of a table; ties go to the first inserted
fn oldest_active(table: &Table) -> Option<&Call> {
    // min_by_key keeps the first of equal minima
    table.active_calls().min_by_key(|c| c.created_at)
}

/// Table-level status: three tiers over the oldest active call
pub fn table_status(table: &Table, thresholds: &Thresholds, now: i64) -> Semaphore {
    let Some(oldest) = oldest_active(table) else {
        return Semaphore::Idle;
    };
    let elapsed = elapsed_millis(oldest.created_at, now);
    if elapsed > thresholds.yellow_millis {
        Semaphore::Red
    } else if elapsed > thresholds.green_millis {
        Semaphore::Yellow
    } else {
        Semaphore::Green
    }
}

/// Per-type status: binary over the first active call of the type in table
/// order, i.e. the oldest by `created_at` for a store-sorted snapshot
pub fn type_status(
    table: &Table,
    call_type: CallType,
    thresholds: &Thresholds,
    now: i64,
) -> Semaphore {
    let Some(reference) = table.active_calls_of(call_type).next() else {
        return Semaphore::Idle;
    };
    if elapsed_millis(reference.created_at, now) > thresholds.yellow_millis {
        Semaphore::Red
    } else {
        Semaphore::Green
    }
}

// ============================================================================
// Board projection
// ============================================================================

/// One call type at one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeView {
    pub call_type: CallType,
    pub status: Semaphore,
    /// Number of pending calls of this type (a queue, not a flag)
    pub active_count: usize,
}

/// One table slot as rendered on the staff board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub number: TableNumber,
    pub status: Semaphore,
    pub active_count: usize,
    /// Age of the oldest active call, whole seconds
    pub oldest_elapsed_secs: Option<i64>,
    pub types: Vec<TypeView>,
}

impl TableView {
    pub fn from_table(table: &Table, thresholds: &Thresholds, now: i64) -> Self {
        let types = CallType::ALL
            .iter()
            .map(|&call_type| TypeView {
                call_type,
                status: type_status(table, call_type, thresholds, now),
                active_count: table.active_calls_of(call_type).count(),
            })
            .collect();

        Self {
            number: table.number.clone(),
            status: table_status(table, thresholds, now),
            active_count: table.active_count(),
            oldest_elapsed_secs: oldest_active(table).map(|c| elapsed_secs(c.created_at, now)),
            types,
        }
    }

    pub fn type_view(&self, call_type: CallType) -> Option<&TypeView> {
        self.types.iter().find(|t| t.call_type == call_type)
    }
}

/// Whole-establishment board computed from one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstablishmentBoard {
    pub establishment_id: String,
    pub is_open: bool,
    pub qty_green: u32,
    pub qty_yellow: u32,
    pub tables: Vec<TableView>,
    /// When the underlying snapshot was read (Unix millis)
    pub fetched_at: i64,
}

impl EstablishmentBoard {
    pub fn table(&self, number: &TableNumber) -> Option<&TableView> {
        self.tables.iter().find(|t| &t.number == number)
    }

    /// Tables with at least one active call, most urgent first.
    ///
    /// Within a level, the table waiting longest comes first.
    pub fn busy_tables(&self) -> Vec<&TableView> {
        let mut busy: Vec<&TableView> = self
            .tables
            .iter()
            .filter(|t| !t.status.is_idle())
            .collect();
        busy.sort_by(|a, b| {
            b.status
                .cmp(&a.status)
                .then_with(|| b.oldest_elapsed_secs.cmp(&a.oldest_elapsed_secs))
        });
        busy
    }
}

/// Project a snapshot onto the board at time `now`.
///
/// `heartbeat_max_age_millis` decides how old a heartbeat may be before the
/// establishment reads as closed.
pub fn board(
    snapshot: &EstablishmentSnapshot,
    now: i64,
    heartbeat_max_age_millis: i64,
) -> EstablishmentBoard {
    let thresholds = snapshot.thresholds();
    EstablishmentBoard {
        establishment_id: snapshot.establishment_id.clone(),
        is_open: snapshot.is_open_at(now, heartbeat_max_age_millis),
        qty_green: thresholds.qty_green,
        qty_yellow: thresholds.qty_yellow,
        tables: snapshot
            .tables()
            .iter()
            .map(|t| TableView::from_table(t, &thresholds, now))
            .collect(),
        fetched_at: snapshot.fetched_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallId, CallStatus, Settings};

    const SEC: i64 = 1000;

    fn thresholds(green: u32, yellow: u32) -> Thresholds {
        Thresholds::resolve(Some(&Settings {
            time_green_seconds: green,
            time_yellow_seconds: yellow,
            ..Settings::default()
        }))
    }

    fn table(calls: &[(i64, CallType, CallStatus, i64)]) -> Table {
        let number = TableNumber::parse("7").unwrap();
        Table {
            number: number.clone(),
            calls: calls
                .iter()
                .map(|&(id, call_type, status, created_at)| Call {
                    id: CallId(id),
                    table_number: number.clone(),
                    call_type,
                    status,
                    created_at,
                })
                .collect(),
        }
    }

    #[test]
    fn test_idle_without_active_calls() {
        let t = thresholds(60, 180);
        let empty = table(&[]);
        assert_eq!(table_status(&empty, &t, 0), Semaphore::Idle);

        let resolved = table(&[
            (1, CallType::Waiter, CallStatus::Attended, 0),
            (2, CallType::Bill, CallStatus::Canceled, 0),
        ]);
        assert_eq!(table_status(&resolved, &t, 500 * SEC), Semaphore::Idle);
        for call_type in CallType::ALL {
            assert_eq!(
                type_status(&resolved, call_type, &t, 500 * SEC),
                Semaphore::Idle
            );
        }
    }

    #[test]
    fn test_table_status_tier_boundaries() {
        let t = thresholds(60, 180);
        let tbl = table(&[(1, CallType::Menu, CallStatus::Sent, 0)]);
        assert_eq!(table_status(&tbl, &t, 0), Semaphore::Green);
        assert_eq!(table_status(&tbl, &t, 60 * SEC), Semaphore::Green);
        assert_eq!(table_status(&tbl, &t, 60 * SEC + 1), Semaphore::Yellow);
        assert_eq!(table_status(&tbl, &t, 180 * SEC), Semaphore::Yellow);
        assert_eq!(table_status(&tbl, &t, 180 * SEC + 1), Semaphore::Red);
    }

    #[test]
    fn test_table_status_is_monotonic_in_time() {
        let t = thresholds(60, 180);
        let tbl = table(&[(1, CallType::Waiter, CallStatus::Viewed, 0)]);
        let mut previous = Semaphore::Idle;
        for s in (0..400).step_by(5) {
            let status = table_status(&tbl, &t, s * SEC);
            assert!(status >= previous, "regressed at {s}s");
            previous = status;
        }
        assert_eq!(previous, Semaphore::Red);
    }

    #[test]
    fn test_table_status_uses_oldest_call() {
        // Two WAITER calls at t=0s and t=10s
        let t = thresholds(60, 180);
        let tbl = table(&[
            (1, CallType::Waiter, CallStatus::Sent, 0),
            (2, CallType::Waiter, CallStatus::Sent, 10 * SEC),
        ]);
        assert_eq!(table_status(&tbl, &t, 40 * SEC), Semaphore::Green);
        assert_eq!(table_status(&tbl, &t, 70 * SEC), Semaphore::Yellow);

        // Once the t=0 call is resolved, the t=10 call is the reference
        let after = table(&[
            (1, CallType::Waiter, CallStatus::Attended, 0),
            (2, CallType::Waiter, CallStatus::Sent, 10 * SEC),
        ]);
        assert_eq!(table_status(&after, &t, 70 * SEC), Semaphore::Green);
    }

    #[test]
    fn test_table_status_oldest_regardless_of_insertion_order() {
        let t = thresholds(60, 180);
        let tbl = table(&[
            (1, CallType::Bill, CallStatus::Sent, 100 * SEC),
            (2, CallType::Menu, CallStatus::Sent, 0),
        ]);
        assert_eq!(table_status(&tbl, &t, 150 * SEC), Semaphore::Yellow);
    }

    #[test]
    fn test_type_status_has_no_yellow_tier() {
        let t = thresholds(60, 180);
        let tbl = table(&[(1, CallType::Bill, CallStatus::Sent, 0)]);
        assert_eq!(type_status(&tbl, CallType::Bill, &t, 100 * SEC), Semaphore::Green);
        assert_eq!(table_status(&tbl, &t, 100 * SEC), Semaphore::Yellow);
        assert_eq!(type_status(&tbl, CallType::Bill, &t, 181 * SEC), Semaphore::Red);
        assert_eq!(type_status(&tbl, CallType::Menu, &t, 181 * SEC), Semaphore::Idle);
    }

    #[test]
    fn test_type_status_uses_earliest_inserted_of_type() {
        let t = thresholds(60, 180);
        // The WAITER call inserted first carries the later timestamp
        let tbl = table(&[
            (1, CallType::Waiter, CallStatus::Sent, 100 * SEC),
            (2, CallType::Waiter, CallStatus::Sent, 0),
        ]);
        assert_eq!(
            type_status(&tbl, CallType::Waiter, &t, 200 * SEC),
            Semaphore::Green
        );
    }

    #[test]
    fn test_quantity_does_not_escalate() {
        let t = thresholds(60, 180);
        let calls: Vec<_> = (1..=10)
            .map(|i| (i, CallType::Waiter, CallStatus::Sent, 0))
            .collect();
        let tbl = table(&calls);
        assert_eq!(type_status(&tbl, CallType::Waiter, &t, SEC), Semaphore::Green);
        assert_eq!(table_status(&tbl, &t, SEC), Semaphore::Green);
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let t = thresholds(60, 180);
        let tbl = table(&[(1, CallType::Waiter, CallStatus::Sent, 10 * SEC)]);
        assert_eq!(table_status(&tbl, &t, 0), Semaphore::Green);
    }

    #[test]
    fn test_board_projection() {
        let number = TableNumber::parse("2").unwrap();
        let snapshot = EstablishmentSnapshot {
            establishment_id: "E1".to_string(),
            settings: Some(Settings {
                total_tables: 3,
                ..Settings::default()
            }),
            is_open: true,
            heartbeat_at: Some(0),
            calls: vec![
                Call {
                    id: CallId(1),
                    table_number: number.clone(),
                    call_type: CallType::Bill,
                    status: CallStatus::Sent,
                    created_at: 0,
                },
                Call {
                    id: CallId(2),
                    table_number: number.clone(),
                    call_type: CallType::Bill,
                    status: CallStatus::Viewed,
                    created_at: 5 * SEC,
                },
            ],
            fetched_at: 0,
        };

        let b = board(&snapshot, 90 * SEC, 120 * SEC);
        assert!(b.is_open);
        assert_eq!(b.tables.len(), 3);
        assert_eq!(b.tables[0].status, Semaphore::Idle);

        let view = b.table(&number).unwrap();
        assert_eq!(view.status, Semaphore::Yellow);
        assert_eq!(view.active_count, 2);
        assert_eq!(view.oldest_elapsed_secs, Some(90));
        let bill = view.type_view(CallType::Bill).unwrap();
        assert_eq!(bill.status, Semaphore::Green);
        assert_eq!(bill.active_count, 2);

        let busy = b.busy_tables();
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].number, number);

        // Stale heartbeat reads as closed
        assert!(!board(&snapshot, 500 * SEC, 120 * SEC).is_open);
    }
}
