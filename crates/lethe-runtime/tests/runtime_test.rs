//! LetheRuntime end to end: manual and scheduled passes, config
//! propagation, alert delivery, shutdown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use lethe_core::config::{AlertRuleConfig, AlertSinkKind, Breach, EngineConfig, ObservabilityConfig};
use lethe_core::memory::{LifecycleStatus, MemoryRow};
use lethe_core::traits::MemoryStore;
use lethe_observability::{AlertCallback, AlertEvent, AlertEventKind};
use lethe_runtime::{LetheRuntime, RuntimeOptions, DECAY_TASK_ID};
use lethe_scheduler::TaskStatus;
use test_fixtures::{load_corpus, uniform_rows};

async fn seed(runtime: &LetheRuntime, rows: Vec<MemoryRow>) {
    let storage = runtime.storage().clone();
    tokio::task::spawn_blocking(move || storage.upsert_rows(&rows).unwrap())
        .await
        .unwrap();
}

async fn wait_until(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

fn with_interval(interval_ms: u64) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.algorithm_config.scheduler.interval_ms = interval_ms;
    config
}

// ── Manual passes ──

#[tokio::test(flavor = "multi_thread")]
async fn manual_pass_updates_store_and_health() {
    let runtime = LetheRuntime::new(RuntimeOptions::default()).unwrap();
    let now = Utc::now();
    let rows = load_corpus("memories/mixed_corpus.json")
        .iter()
        .map(|e| e.to_row(now))
        .collect();
    seed(&runtime, rows).await;

    let report = runtime.run_decay_pass_now().await.unwrap().unwrap();
    assert_eq!(report.stats.processed_memories, 7);
    assert_eq!(report.transition_total(), 4);

    let storage = runtime.storage().clone();
    let stale = tokio::task::spawn_blocking(move || storage.get_row("a-stale-active").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(stale.score < 70.0);
    assert_eq!(stale.meta.status, LifecycleStatus::Cold);

    let health = runtime.health();
    assert_eq!(health.config_version, 0);
    assert_eq!(health.metrics.decay.total_passes, 1);
    assert_eq!(health.scheduler.total_task_count, 1);
    assert_eq!(health.scheduler.tasks[0].id, DECAY_TASK_ID);
    assert_eq!(health.scheduler.tasks[0].status, TaskStatus::Idle);
    assert_eq!(health.scheduler.tasks[0].metrics.success_count, 1);
    assert_eq!(health.last_pass.unwrap().pass_id, report.pass_id);
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduler_toggle_off_skips_manual_pass() {
    let runtime = LetheRuntime::new(RuntimeOptions::default()).unwrap();
    runtime
        .config()
        .update(json!({"feature_toggles": {"scheduler": false}}))
        .await
        .unwrap();
    assert!(runtime.run_decay_pass_now().await.unwrap().is_none());
    assert_eq!(runtime.health().metrics.decay.total_passes, 0);
}

// ── Scheduled passes ──

#[tokio::test(flavor = "multi_thread")]
async fn scheduled_passes_run_until_stopped() {
    let runtime = LetheRuntime::new(RuntimeOptions::in_memory(with_interval(20))).unwrap();
    seed(&runtime, uniform_rows(30, 50.0)).await;
    runtime.start().unwrap();

    wait_until("two scheduled passes", || {
        runtime.health().metrics.decay.total_passes >= 2
    })
    .await;

    runtime.stop().await;
    let health = runtime.health();
    assert_eq!(health.scheduler.stopped_task_count, 1);
    assert_eq!(health.scheduler.running_task_count, 0);
    let passes = health.metrics.decay.total_passes;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(runtime.health().metrics.decay.total_passes, passes);
    assert!(runtime.start().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn pause_and_resume_through_runtime() {
    let runtime = LetheRuntime::new(RuntimeOptions::in_memory(with_interval(20))).unwrap();
    runtime.start().unwrap();
    runtime.pause().unwrap();
    assert_eq!(runtime.health().scheduler.paused_task_count, 1);
    runtime.resume().unwrap();
    assert_eq!(runtime.health().scheduler.running_task_count, 1);
    runtime.stop().await;
}

// ── Config propagation ──

#[tokio::test(flavor = "multi_thread")]
async fn reload_updates_interval_and_metrics() {
    let runtime = LetheRuntime::new(RuntimeOptions::default()).unwrap();
    let version = runtime
        .config()
        .update(json!({"scheduler": {"intervalMs": 1234}}))
        .await
        .unwrap();
    assert_eq!(version, 1);

    wait_until("interval change", || {
        runtime
            .scheduler()
            .task_snapshot(DECAY_TASK_ID)
            .map(|t| t.interval_ms == 1234)
            .unwrap_or(false)
    })
    .await;
    let health = runtime.health();
    assert_eq!(health.config_version, 1);
    assert_eq!(health.metrics.config.reloads_applied, 1);
    assert_eq!(health.metrics.config.current_version, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_reload_is_counted_and_ignored() {
    let runtime = LetheRuntime::new(RuntimeOptions::default()).unwrap();
    let err = runtime.config().update(json!({"min_score": 500.0})).await;
    assert!(err.is_err());

    wait_until("rejection recorded", || {
        runtime.health().metrics.config.reloads_rejected == 1
    })
    .await;
    assert_eq!(runtime.health().config_version, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn toggles_reach_observability() {
    let runtime = LetheRuntime::new(RuntimeOptions::default()).unwrap();
    runtime
        .config()
        .update(json!({"featureToggles": {"alerting": false, "logging": false}}))
        .await
        .unwrap();
    let observability = Arc::clone(runtime.observability());
    wait_until("toggles applied", || {
        let obs = observability.lock().unwrap();
        !obs.alerts.is_enabled() && !obs.logging_enabled()
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn file_config_loaded_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lethe.toml");
    std::fs::write(
        &path,
        "[algorithm_config.scheduler]\ninterval_ms = 4321\nbatch_size = 7\n",
    )
    .unwrap();

    let runtime = LetheRuntime::new(RuntimeOptions {
        config_path: Some(path),
        db_path: Some(dir.path().join("lethe.db")),
        ..Default::default()
    })
    .unwrap();
    let snapshot = runtime.config().snapshot();
    assert_eq!(snapshot.algorithm().scheduler.interval_ms, 4321);
    assert_eq!(snapshot.algorithm().scheduler.batch_size, 7);
    assert_eq!(
        runtime.scheduler().task_snapshot(DECAY_TASK_ID).unwrap().interval_ms,
        4321
    );
}

// ── Alerts ──

#[tokio::test(flavor = "multi_thread")]
async fn alert_callback_receives_triggered_event() {
    let received: Arc<Mutex<Vec<AlertEvent>>> = Arc::default();
    let callback: AlertCallback = {
        let received = Arc::clone(&received);
        Arc::new(move |event: &AlertEvent| received.lock().unwrap().push(event.clone()))
    };
    let observability = ObservabilityConfig {
        alert_sinks: vec![AlertSinkKind::Callback],
        rules: vec![AlertRuleConfig {
            metric: "pass_duration_ms".to_string(),
            warning: -1.0,
            critical: 1e12,
            breach: Breach::Above,
        }],
        ..Default::default()
    };
    let runtime = LetheRuntime::new(RuntimeOptions {
        observability,
        alert_callback: Some(callback),
        ..Default::default()
    })
    .unwrap();
    seed(&runtime, uniform_rows(5, 50.0)).await;

    let report = runtime.run_decay_pass_now().await.unwrap().unwrap();
    assert_eq!(report.alerts_raised, 1);

    let events = received.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertEventKind::Triggered);
    assert_eq!(events[0].alert.metric, "pass_duration_ms");
    drop(events);

    assert_eq!(runtime.health().alerts.len(), 1);
    assert!(runtime.silence_alert("pass_duration_ms", None));
}
