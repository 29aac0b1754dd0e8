//! LetheRuntime: owns every engine, the decay task registration, config
//! propagation, and graceful shutdown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;

use lethe_config::{ConfigStore, ConfigWatcher};
use lethe_core::config::EngineConfig;
use lethe_core::errors::LetheResult;
use lethe_core::models::PerformanceAlert;
use lethe_observability::metrics::MetricsCollector;
use lethe_observability::tracing_setup;
use lethe_observability::ObservabilityEngine;
use lethe_scheduler::{Scheduler, SchedulerSnapshot};
use lethe_storage::StorageEngine;

use crate::decay_task::{DecayPassReport, DecayTask, DECAY_TASK_ID};
use crate::listener;
use crate::options::RuntimeOptions;

/// Poll interval while waiting for an in-flight pass during shutdown.
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Health surface: scheduler state, metrics, live alerts, config version.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub scheduler: SchedulerSnapshot,
    pub metrics: MetricsCollector,
    pub alerts: Vec<PerformanceAlert>,
    pub config_version: u64,
    pub last_pass: Option<DecayPassReport>,
    pub generated_at: DateTime<Utc>,
}

/// The central runtime owning all Lethe engines.
///
/// `ObservabilityEngine` needs `&mut self` and is shared behind a `Mutex`
/// with the decay task and the config listener.
pub struct LetheRuntime {
    storage: StorageEngine,
    config: ConfigStore,
    observability: Arc<Mutex<ObservabilityEngine>>,
    scheduler: Scheduler,
    decay: Arc<DecayTask>,
    listener: Mutex<Option<JoinHandle<()>>>,
    watcher: Mutex<Option<ConfigWatcher>>,
    watch: Option<(std::path::PathBuf, Duration)>,
}

impl LetheRuntime {
    /// Build every engine and register the decay task (idle until
    /// [`start`](Self::start)). Must be called inside a tokio runtime.
    pub fn new(opts: RuntimeOptions) -> LetheResult<Self> {
        if opts.init_tracing && !tracing_setup::init_tracing(&opts.observability)? {
            tracing::debug!("global tracing subscriber already installed");
        }

        let engine_config = match &opts.config_path {
            Some(path) => EngineConfig::from_path(path)?,
            None => opts.engine_config.clone(),
        };

        // Storage
        let storage = match &opts.db_path {
            Some(path) => StorageEngine::open(path)?,
            None => StorageEngine::open_in_memory()?,
        };

        // Config
        let config = ConfigStore::spawn(engine_config)?;
        let snapshot = config.snapshot();

        // Observability
        let mut obs = ObservabilityEngine::new(&opts.observability, opts.alert_callback.clone())?;
        listener::sync_toggles(&mut obs, &snapshot);
        obs.metrics.config.current_version = snapshot.version;
        let observability = Arc::new(Mutex::new(obs));

        // Scheduler + decay task
        let scheduler = Scheduler::new();
        let decay = Arc::new(DecayTask::new(
            storage.clone(),
            config.clone(),
            Arc::clone(&observability),
            opts.lock_retry,
        ));
        scheduler.register(
            DECAY_TASK_ID,
            snapshot.algorithm().scheduler.interval_ms,
            decay.handler(),
        )?;

        // Config propagation
        let listener = listener::spawn(
            config.subscribe(),
            Arc::clone(&observability),
            scheduler.clone(),
        );

        let watch = match (&opts.config_path, opts.watch_config) {
            (Some(path), true) => Some((path.clone(), opts.debounce())),
            _ => None,
        };

        tracing::info!(
            db = ?storage.db_path(),
            config_version = snapshot.version,
            interval_ms = snapshot.algorithm().scheduler.interval_ms,
            "lethe runtime initialized"
        );

        Ok(Self {
            storage,
            config,
            observability,
            scheduler,
            decay,
            listener: Mutex::new(Some(listener)),
            watcher: Mutex::new(None),
            watch,
        })
    }

    /// Start the decay schedule and, if configured, the config file watch.
    pub fn start(&self) -> LetheResult<()> {
        if let Some((path, debounce)) = &self.watch {
            let watcher = self.config.watch_file(path.clone(), *debounce)?;
            *self.watcher.lock().unwrap_or_else(|e| e.into_inner()) = Some(watcher);
        }
        self.scheduler.start(DECAY_TASK_ID)
    }

    pub fn pause(&self) -> LetheResult<()> {
        self.scheduler.pause(DECAY_TASK_ID)
    }

    pub fn resume(&self) -> LetheResult<()> {
        self.scheduler.resume(DECAY_TASK_ID)
    }

    /// Run one decay pass now, through the scheduler's overlap guard.
    /// Returns `None` when a pass was already executing or the `scheduler`
    /// toggle is off.
    pub async fn run_decay_pass_now(&self) -> LetheResult<Option<DecayPassReport>> {
        if !self.config.snapshot().toggles().scheduler {
            return Ok(None);
        }
        if !self.scheduler.run_now(DECAY_TASK_ID).await? {
            return Ok(None);
        }
        let metrics = self.scheduler.task_snapshot(DECAY_TASK_ID)?.metrics;
        if let Some(reason) = metrics.last_error_message {
            return Err(lethe_core::errors::SchedulerError::TaskFailed {
                id: DECAY_TASK_ID.to_string(),
                reason,
            }
            .into());
        }
        Ok(self.decay.last_report())
    }

    /// Ask the pass in flight to stop at its next row boundary. Committed
    /// work is kept and the next pass resumes from the checkpoint.
    pub fn interrupt_pass(&self) {
        self.decay.interrupt();
    }

    /// Stop scheduling, interrupt any pass in flight and wait for it to
    /// settle, then stop watching and listening for config changes.
    pub async fn stop(&self) {
        self.scheduler.stop_all();
        self.decay.interrupt();
        while self.scheduler.is_executing(DECAY_TASK_ID).unwrap_or(false) {
            tokio::time::sleep(SHUTDOWN_POLL).await;
        }
        self.watcher.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = self.listener.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
        tracing::info!("lethe runtime stopped");
    }

    pub fn health(&self) -> HealthReport {
        let obs = self.observability.lock().unwrap_or_else(|e| e.into_inner());
        HealthReport {
            scheduler: self.scheduler.snapshot(),
            metrics: obs.metrics.clone(),
            alerts: obs.alerts.live_alerts(),
            config_version: self.config.version(),
            last_pass: self.decay.last_report(),
            generated_at: Utc::now(),
        }
    }

    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn decay_task(&self) -> &Arc<DecayTask> {
        &self.decay
    }

    pub fn observability(&self) -> &Arc<Mutex<ObservabilityEngine>> {
        &self.observability
    }

    pub fn silence_alert(&self, metric: &str, until: Option<DateTime<Utc>>) -> bool {
        self.observability
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .silence_alert(metric, until)
    }

    pub fn unsilence_alert(&self, metric: &str) -> bool {
        self.observability
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .unsilence_alert(metric)
    }
}

impl Drop for LetheRuntime {
    fn drop(&mut self) {
        self.decay.interrupt();
        self.scheduler.stop_all();
        if let Some(handle) = self.listener.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }
}
