//! Alert lifecycle and sink delivery.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use lethe_core::config::{AlertRuleConfig, Breach};
use lethe_core::models::{AlertSeverity, AlertState};
use lethe_observability::alerting::{CallbackSink, FileSink};
use lethe_observability::{AlertEvent, AlertEventKind, AlertManager, RotatingFileWriter};
use serde_json::json;

fn failed_batches_rule() -> AlertRuleConfig {
    AlertRuleConfig {
        metric: "failed_batches".to_string(),
        warning: 1.0,
        critical: 5.0,
        breach: Breach::Above,
    }
}

fn recording_manager() -> (AlertManager, Arc<Mutex<Vec<AlertEvent>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let mut mgr = AlertManager::new(vec![failed_batches_rule()]);
    mgr.add_sink(Box::new(CallbackSink::new(Arc::new(move |e: &AlertEvent| {
        sink_seen.lock().unwrap().push(e.clone());
    }))));
    (mgr, seen)
}

fn kinds(seen: &Mutex<Vec<AlertEvent>>) -> Vec<AlertEventKind> {
    seen.lock().unwrap().iter().map(|e| e.kind).collect()
}

#[test]
fn trigger_update_recover() {
    let (mut mgr, seen) = recording_manager();
    let now = Utc::now();

    assert!(mgr.evaluate("failed_batches", 0.0, json!({}), now).is_none());

    let e = mgr.evaluate("failed_batches", 2.0, json!({}), now).unwrap();
    assert_eq!(e.kind, AlertEventKind::Triggered);
    assert_eq!(e.alert.severity, AlertSeverity::Warning);

    // Same severity: value tracked, no event.
    assert!(mgr.evaluate("failed_batches", 3.0, json!({}), now).is_none());
    assert_eq!(mgr.get("failed_batches").unwrap().value, 3.0);

    let e = mgr.evaluate("failed_batches", 9.0, json!({}), now).unwrap();
    assert_eq!(e.kind, AlertEventKind::Updated);
    assert_eq!(e.alert.severity, AlertSeverity::Critical);
    assert_eq!(e.alert.triggered_at, now);

    let e = mgr.evaluate("failed_batches", 0.0, json!({}), now).unwrap();
    assert_eq!(e.kind, AlertEventKind::Recovered);
    assert!(mgr.get("failed_batches").is_none());

    assert_eq!(
        kinds(&seen),
        [
            AlertEventKind::Triggered,
            AlertEventKind::Updated,
            AlertEventKind::Recovered
        ]
    );
}

#[test]
fn one_live_alert_per_metric() {
    let (mut mgr, _) = recording_manager();
    let now = Utc::now();
    mgr.evaluate("failed_batches", 2.0, json!({}), now);
    mgr.evaluate("failed_batches", 6.0, json!({}), now);
    mgr.evaluate("failed_batches", 2.0, json!({}), now);
    assert_eq!(mgr.live_alerts().len(), 1);
}

#[test]
fn unknown_metric_is_ignored() {
    let (mut mgr, seen) = recording_manager();
    assert!(mgr.evaluate("nope", 1e9, json!({}), Utc::now()).is_none());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn silenced_alert_keeps_tracking_but_stays_quiet() {
    let (mut mgr, seen) = recording_manager();
    let now = Utc::now();
    mgr.evaluate("failed_batches", 2.0, json!({}), now);
    assert!(mgr.silence("failed_batches", None, now));
    assert_eq!(mgr.get("failed_batches").unwrap().state, AlertState::Silenced);

    // Severity change while silenced: recorded, not delivered.
    let e = mgr.evaluate("failed_batches", 8.0, json!({}), now).unwrap();
    assert_eq!(e.kind, AlertEventKind::Updated);
    assert_eq!(
        kinds(&seen),
        [AlertEventKind::Triggered, AlertEventKind::Silenced]
    );

    assert!(mgr.unsilence("failed_batches", now));
    assert!(!mgr.unsilence("failed_batches", now));
    assert_eq!(mgr.get("failed_batches").unwrap().state, AlertState::Active);
    assert_eq!(mgr.get("failed_batches").unwrap().severity, AlertSeverity::Critical);
}

#[test]
fn silence_expires() {
    let (mut mgr, seen) = recording_manager();
    let now = Utc::now();
    mgr.evaluate("failed_batches", 2.0, json!({}), now);
    mgr.silence("failed_batches", Some(now + Duration::minutes(5)), now);

    let later = now + Duration::minutes(10);
    let e = mgr.evaluate("failed_batches", 9.0, json!({}), later).unwrap();
    assert_eq!(e.alert.state, AlertState::Active);
    assert_eq!(
        kinds(&seen),
        [
            AlertEventKind::Triggered,
            AlertEventKind::Silenced,
            AlertEventKind::Unsilenced,
            AlertEventKind::Updated
        ]
    );
}

#[test]
fn silence_without_live_alert_is_rejected() {
    let (mut mgr, _) = recording_manager();
    assert!(!mgr.silence("failed_batches", None, Utc::now()));
}

#[test]
fn file_sink_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    let mut mgr = AlertManager::new(vec![failed_batches_rule()]);
    mgr.add_sink(Box::new(FileSink::new(
        RotatingFileWriter::open(&path, 1 << 20, 2).unwrap(),
    )));

    let now = Utc::now();
    mgr.evaluate("failed_batches", 2.0, json!({"offset": 500}), now);
    mgr.evaluate("failed_batches", 0.0, json!({}), now);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["kind"], "triggered");
    assert_eq!(lines[0]["alert"]["context"]["offset"], 500);
    assert_eq!(lines[1]["kind"], "recovered");
}

#[test]
fn panicking_callback_is_swallowed() {
    let mut mgr = AlertManager::new(vec![failed_batches_rule()]);
    mgr.add_sink(Box::new(CallbackSink::new(Arc::new(|_: &AlertEvent| {
        panic!("sink exploded")
    }))));
    let e = mgr.evaluate("failed_batches", 3.0, json!({}), Utc::now());
    assert!(e.is_some());
}
