use call_engine::calls::CallEventKind;
use call_engine::{
    BackgroundTasks, CallsManager, Config, MemoryCallStore, Session, SessionSubject, SyncContext,
    SystemClock, TaskKind, setup_environment,
};
use shared::AppError;
use shared::models::{CallType, Settings};
use std::sync::Arc;
use std::time::Duration;

/// Simulated customers raise a call this often
const DEMO_CALL_INTERVAL_SECS: u64 = 7;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境 (dotenv, 配置, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    setup_environment(&config)?;

    tracing::info!(
        environment = %config.environment,
        establishment_id = %config.demo_establishment_id,
        "Call engine demo starting..."
    );

    // 2. 存储与引擎
    let clock = SystemClock::shared();
    let store = Arc::new(MemoryCallStore::new(clock.clone()));
    store.register_establishment(&config.demo_establishment_id, Some(Settings::default()));

    let manager = Arc::new(CallsManager::new(store.clone(), clock.clone()));
    let ctx = Arc::new(SyncContext::new(store, clock, config.sync_config()));

    // 3. 后台任务
    let mut tasks = BackgroundTasks::new();
    let session = Arc::new(Session::new(ctx, manager.clone(), tasks.shutdown_token()));
    session.start(SessionSubject::owner(config.demo_establishment_id.clone()));

    {
        let shutdown = tasks.shutdown_token();
        let mut events = manager.subscribe();
        tasks.spawn("event_logger", TaskKind::Worker, async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) if event.kind == CallEventKind::CallAdded => {
                            tracing::info!(table = ?event.table, call_type = ?event.call_type, "Customer call");
                        }
                        Ok(event) => tracing::debug!(kind = ?event.kind, calls = event.call_ids.len(), "Call event"),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Event logger lagged {n} events");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    {
        let session = session.clone();
        let establishment_id = config.demo_establishment_id.clone();
        let total_tables = Settings::default().total_tables;
        let mut n: u32 = 0;
        tasks.spawn_periodic(
            "demo_customers",
            Duration::from_secs(DEMO_CALL_INTERVAL_SECS),
            move || {
                let session = session.clone();
                let establishment_id = establishment_id.clone();
                let i = n;
                n = n.wrapping_add(1);
                async move {
                    let table = (i % total_tables + 1).to_string();
                    let call_type = CallType::ALL[i as usize % CallType::ALL.len()];
                    if let Err(e) = session.add_call(&establishment_id, &table, call_type).await {
                        report("Demo call failed", e.into());
                    }
                    // 每隔几次由服务员处理最早的呼叫
                    if i % 3 == 2 {
                        if let Err(e) = session
                            .attend_oldest_call_by_type(&establishment_id, &table, call_type)
                            .await
                        {
                            report("Demo attend failed", e.into());
                        }
                    }
                }
            },
        );
    }

    {
        let session = session.clone();
        tasks.spawn_periodic("board_printer", config.sync_config().interval, move || {
            let session = session.clone();
            async move {
                for board in session.boards() {
                    let busy: Vec<String> = board
                        .busy_tables()
                        .iter()
                        .map(|t| format!("{}:{:?}({})", t.number, t.status, t.active_count))
                        .collect();
                    tracing::info!(
                        establishment_id = %board.establishment_id,
                        is_open = board.is_open,
                        busy = ?busy,
                        "Board"
                    );
                }
            }
        });
    }

    // 4. 等待退出信号
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    if let Err(e) = session.logout().await {
        report("Logout failed", e.into());
    }
    let exited = tasks.finished_tasks();
    if !exited.is_empty() {
        tracing::warn!(tasks = ?exited, "Some background tasks exited early");
    }
    tasks.shutdown().await;

    Ok(())
}

fn report(context: &str, err: AppError) {
    tracing::warn!(
        code = err.code.code(),
        category = err.code.category().name(),
        transient = err.is_transient(),
        error = %err,
        "{context}"
    );
}
