//! Applies config changes to the rest of the runtime.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use lethe_config::{ConfigEvent, ConfigSnapshot};
use lethe_observability::ObservabilityEngine;
use lethe_scheduler::Scheduler;

use crate::decay_task::DECAY_TASK_ID;

/// Spawn the listener. It runs until the event bus closes or the handle is
/// aborted.
pub(crate) fn spawn(
    mut events: broadcast::Receiver<ConfigEvent>,
    observability: Arc<Mutex<ObservabilityEngine>>,
    scheduler: Scheduler,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => apply(&event, &observability, &scheduler),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "config listener lagged behind the event bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Mirror one config event into observability and the scheduler.
pub(crate) fn apply(
    event: &ConfigEvent,
    observability: &Mutex<ObservabilityEngine>,
    scheduler: &Scheduler,
) {
    match event {
        ConfigEvent::Reloaded {
            version,
            previous,
            current,
            ..
        } => {
            {
                let mut obs = observability.lock().unwrap_or_else(|e| e.into_inner());
                obs.record_config_reload(*version);
                sync_toggles(&mut obs, current);
            }
            let interval = current.algorithm().scheduler.interval_ms;
            if interval != previous.algorithm().scheduler.interval_ms {
                if let Err(e) = scheduler.set_interval(DECAY_TASK_ID, interval) {
                    tracing::warn!(error = %e, interval_ms = interval, "decay interval not applied");
                }
            }
        }
        ConfigEvent::ReloadFailed { .. } => {
            let mut obs = observability.lock().unwrap_or_else(|e| e.into_inner());
            obs.record_config_rejected();
        }
    }
}

pub(crate) fn sync_toggles(obs: &mut ObservabilityEngine, snapshot: &ConfigSnapshot) {
    let toggles = snapshot.toggles();
    obs.apply_toggles(toggles.alerting, toggles.logging);
}
