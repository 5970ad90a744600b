use super::*;

#[tokio::test]
async fn test_add_call_is_sent_and_queues() {
    let h = create_test_manager();
    let first = add_call_at(&h, "7", CallType::Waiter, 0).await;
    let second = add_call_at(&h, "7", CallType::Waiter, 10).await;

    assert_ne!(first, second);
    assert_eq!(status_of(&h, first), CallStatus::Sent);
    assert_eq!(active_count(&h, "7", CallType::Waiter).await, 2);

    let calls = active_at(&h, "7").await;
    assert_eq!(calls[0].created_at, 0);
    assert_eq!(calls[1].created_at, 10_000);
}

#[tokio::test]
async fn test_add_call_normalizes_table() {
    let h = create_test_manager();
    add_call_at(&h, " 07 ", CallType::Menu, 0).await;
    assert_eq!(active_count(&h, "7", CallType::Menu).await, 1);
}

#[tokio::test]
async fn test_add_call_rejects_bad_table() {
    let h = create_test_manager();
    let err = h.manager.add_call(EST, "", CallType::Bill).await.unwrap_err();
    assert!(matches!(err, ManagerError::InvalidTable(_)));

    let err = h
        .manager
        .add_call(EST, "1234", CallType::Bill)
        .await
        .unwrap_err();
    let app: shared::AppError = err.into();
    assert_eq!(app.code, shared::ErrorCode::InvalidTableNumber);
    assert!(h.store.all_calls(EST).is_empty());
}

#[tokio::test]
async fn test_attend_picks_oldest_of_type() {
    let h = create_test_manager();
    let oldest = add_call_at(&h, "7", CallType::Waiter, 0).await;
    let newer = add_call_at(&h, "7", CallType::Waiter, 10).await;

    let attended = h
        .manager
        .attend_oldest_call_by_type(EST, "7", CallType::Waiter)
        .await
        .unwrap();
    assert_eq!(attended, Some(oldest));
    assert_eq!(status_of(&h, oldest), CallStatus::Attended);
    assert_eq!(status_of(&h, newer), CallStatus::Sent);
}

#[tokio::test]
async fn test_attend_tie_breaks_by_insertion_order() {
    let h = create_test_manager();
    let first = add_call_at(&h, "3", CallType::Bill, 5).await;
    let second = add_call_at(&h, "3", CallType::Bill, 5).await;

    let attended = h
        .manager
        .attend_oldest_call_by_type(EST, "3", CallType::Bill)
        .await
        .unwrap();
    assert_eq!(attended, Some(first));
    assert_eq!(status_of(&h, second), CallStatus::Sent);
}

#[tokio::test]
async fn test_attend_decrements_only_that_type_and_table() {
    let h = create_test_manager();
    add_call_at(&h, "7", CallType::Waiter, 0).await;
    add_call_at(&h, "7", CallType::Waiter, 1).await;
    add_call_at(&h, "7", CallType::Menu, 2).await;
    add_call_at(&h, "8", CallType::Waiter, 3).await;

    h.manager
        .attend_oldest_call_by_type(EST, "7", CallType::Waiter)
        .await
        .unwrap();

    assert_eq!(active_count(&h, "7", CallType::Waiter).await, 1);
    assert_eq!(active_count(&h, "7", CallType::Menu).await, 1);
    assert_eq!(active_count(&h, "8", CallType::Waiter).await, 1);
}

#[tokio::test]
async fn test_attend_twice_is_noop() {
    let h = create_test_manager();
    let only = add_call_at(&h, "7", CallType::Waiter, 0).await;

    let first = h
        .manager
        .attend_oldest_call_by_type(EST, "7", CallType::Waiter)
        .await
        .unwrap();
    let second = h
        .manager
        .attend_oldest_call_by_type(EST, "7", CallType::Waiter)
        .await
        .unwrap();

    assert_eq!(first, Some(only));
    assert_eq!(second, None);
    let calls = h.store.all_calls(EST);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].status, CallStatus::Attended);
}

#[tokio::test]
async fn test_cancel_oldest() {
    let h = create_test_manager();
    let oldest = add_call_at(&h, "2", CallType::Menu, 0).await;
    add_call_at(&h, "2", CallType::Menu, 30).await;

    let canceled = h
        .manager
        .cancel_oldest_call_by_type(EST, "2", CallType::Menu)
        .await
        .unwrap();
    assert_eq!(canceled, Some(oldest));
    assert_eq!(status_of(&h, oldest), CallStatus::Canceled);
    assert_eq!(active_count(&h, "2", CallType::Menu).await, 1);
}

#[tokio::test]
async fn test_cancel_without_active_call_is_noop() {
    let h = create_test_manager();
    let id = add_call_at(&h, "2", CallType::Bill, 0).await;
    h.manager
        .attend_oldest_call_by_type(EST, "2", CallType::Bill)
        .await
        .unwrap();

    let canceled = h
        .manager
        .cancel_oldest_call_by_type(EST, "2", CallType::Bill)
        .await
        .unwrap();
    assert_eq!(canceled, None);
    // 终态不可被覆盖
    assert_eq!(status_of(&h, id), CallStatus::Attended);
}

#[tokio::test]
async fn test_viewed_call_can_still_be_attended() {
    let h = create_test_manager();
    let id = add_call_at(&h, "4", CallType::Waiter, 0).await;
    h.manager.view_all_calls_for_table(EST, "4").await.unwrap();
    assert_eq!(status_of(&h, id), CallStatus::Viewed);

    let attended = h
        .manager
        .attend_oldest_call_by_type(EST, "4", CallType::Waiter)
        .await
        .unwrap();
    assert_eq!(attended, Some(id));
}

#[tokio::test]
async fn test_events_are_broadcast() {
    let h = create_test_manager();
    let mut rx = h.manager.subscribe();

    let id = add_call_at(&h, "7", CallType::Waiter, 0).await;
    h.manager
        .attend_oldest_call_by_type(EST, "7", CallType::Waiter)
        .await
        .unwrap();
    // no-op produces no event
    h.manager
        .attend_oldest_call_by_type(EST, "7", CallType::Waiter)
        .await
        .unwrap();

    let added = rx.recv().await.unwrap();
    assert_eq!(added.kind, CallEventKind::CallAdded);
    assert_eq!(added.call_ids, vec![id]);

    let attended = rx.recv().await.unwrap();
    assert_eq!(attended.kind, CallEventKind::CallAttended);
    assert_eq!(attended.call_type, Some(CallType::Waiter));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_store_failure_is_transient() {
    let h = create_test_manager();
    h.store.set_offline(true);

    let err = h
        .manager
        .add_call(EST, "1", CallType::Waiter)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    let app: shared::AppError = err.into();
    assert_eq!(app.code, shared::ErrorCode::StoreUnavailable);
}
