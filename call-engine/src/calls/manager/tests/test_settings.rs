use super::*;
use shared::ErrorCode;

fn input(green: i64, yellow: i64, total_tables: i64) -> SettingsInput {
    SettingsInput {
        time_green_seconds: green,
        time_yellow_seconds: yellow,
        qty_green: 2,
        qty_yellow: 4,
        total_tables,
    }
}

#[tokio::test]
async fn test_update_settings_persists() {
    let h = create_test_manager();
    let mut rx = h.manager.subscribe();

    let saved = h
        .manager
        .update_settings(EST, input(30, 90, 12))
        .await
        .unwrap();
    assert_eq!(saved.time_green_seconds, 30);

    let snapshot = h.store.get_establishment_snapshot(EST).await.unwrap();
    assert_eq!(snapshot.settings, Some(saved));
    assert_eq!(snapshot.thresholds().total_tables, 12);
    assert_eq!(rx.recv().await.unwrap().kind, CallEventKind::SettingsUpdated);
}

#[tokio::test]
async fn test_update_settings_rejects_inverted_times() {
    let h = create_test_manager();
    let err = h
        .manager
        .update_settings(EST, input(180, 60, 20))
        .await
        .unwrap_err();
    let app: shared::AppError = err.into();
    assert_eq!(app.code, ErrorCode::InvalidTimeThresholds);

    // 原设置保持不变
    let snapshot = h.store.get_establishment_snapshot(EST).await.unwrap();
    assert_eq!(snapshot.settings, Some(Settings::default()));
}

#[tokio::test]
async fn test_update_settings_rejects_equal_and_negative() {
    let h = create_test_manager();
    for bad in [input(60, 60, 20), input(-1, 60, 20)] {
        let err = h.manager.update_settings(EST, bad).await.unwrap_err();
        assert!(matches!(err, ManagerError::InvalidSettings(_)));
    }

    let mut qty = input(60, 180, 20);
    qty.qty_green = 5;
    let app: shared::AppError = h
        .manager
        .update_settings(EST, qty)
        .await
        .unwrap_err()
        .into();
    assert_eq!(app.code, ErrorCode::InvalidQuantityThresholds);

    let app: shared::AppError = h
        .manager
        .update_settings(EST, input(60, 180, 0))
        .await
        .unwrap_err()
        .into();
    assert_eq!(app.code, ErrorCode::InvalidTableCount);
}

#[tokio::test]
async fn test_update_settings_unknown_establishment() {
    let h = create_test_manager();
    let err = h
        .manager
        .update_settings("nowhere", input(60, 180, 20))
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    let app: shared::AppError = err.into();
    assert_eq!(app.code, ErrorCode::EstablishmentNotFound);
}
