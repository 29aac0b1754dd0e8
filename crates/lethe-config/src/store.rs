//! Versioned holder plus the single-writer reload queue.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};

use lethe_core::config::{defaults, source, EngineConfig};
use lethe_core::errors::ConfigError;

use crate::events::{ConfigEvent, ConfigSnapshot};

/// Reload requests waiting for the writer.
const QUEUE_DEPTH: usize = 32;

enum Request {
    /// Complete source; missing fields take defaults.
    Replace(Value),
    /// Partial source deep-merged onto the current config.
    Patch(Value),
    /// Complete source read from disk when the writer gets to it.
    File(PathBuf),
}

struct Command {
    request: Request,
    source: String,
    reply: oneshot::Sender<Result<u64, ConfigError>>,
}

struct Shared {
    current: RwLock<Arc<ConfigSnapshot>>,
    events: broadcast::Sender<ConfigEvent>,
}

impl Shared {
    fn load(&self) -> Arc<ConfigSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }
}

/// Cheap to clone; all clones share one config and one writer.
#[derive(Clone)]
pub struct ConfigStore {
    shared: Arc<Shared>,
    queue: mpsc::Sender<Command>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("version", &self.version())
            .finish()
    }
}

impl ConfigStore {
    /// Validate `initial`, install it as version 0, and spawn the writer
    /// task. Must be called inside a tokio runtime.
    pub fn spawn(initial: EngineConfig) -> Result<Self, ConfigError> {
        initial.validate()?;
        let (events, _) = broadcast::channel(defaults::DEFAULT_CONFIG_EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            current: RwLock::new(Arc::new(ConfigSnapshot {
                version: 0,
                config: initial,
            })),
            events,
        });
        let (queue, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(writer_loop(Arc::clone(&shared), rx));
        Ok(Self { shared, queue })
    }

    /// Current snapshot. Never blocks on a reload in progress.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.shared.load()
    }

    pub fn version(&self) -> u64 {
        self.shared.load().version
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.shared.events.subscribe()
    }

    /// Replace the config with a complete source. Returns the new version.
    pub async fn reload(&self, value: Value) -> Result<u64, ConfigError> {
        self.submit(Request::Replace(value), "reload").await
    }

    /// Deep-merge a partial source onto the current config.
    pub async fn update(&self, patch: Value) -> Result<u64, ConfigError> {
        self.submit(Request::Patch(patch), "update").await
    }

    /// Replace the config with the contents of a JSON or TOML file.
    pub async fn reload_from_file(&self, path: impl Into<PathBuf>) -> Result<u64, ConfigError> {
        let path = path.into();
        let source = path.display().to_string();
        self.submit(Request::File(path), &source).await
    }

    async fn submit(&self, request: Request, source: &str) -> Result<u64, ConfigError> {
        let (reply, rx) = oneshot::channel();
        self.queue
            .send(Command {
                request,
                source: source.to_string(),
                reply,
            })
            .await
            .map_err(|_| ConfigError::ReloadQueueClosed)?;
        rx.await.map_err(|_| ConfigError::ReloadQueueClosed)?
    }
}

async fn writer_loop(shared: Arc<Shared>, mut rx: mpsc::Receiver<Command>) {
    while let Some(cmd) = rx.recv().await {
        let result = apply(&shared, cmd.request, &cmd.source);
        // The caller may have stopped waiting.
        let _ = cmd.reply.send(result);
    }
    tracing::debug!("config writer stopped");
}

fn apply(shared: &Shared, request: Request, source_name: &str) -> Result<u64, ConfigError> {
    let previous = shared.load();
    let candidate = match request {
        Request::Replace(value) => EngineConfig::from_value(value),
        Request::Patch(patch) => previous.config.merged(patch),
        Request::File(path) => source::read_source(&path).and_then(EngineConfig::from_value),
    };

    let config = match candidate {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(
                event = "config_reload_failed",
                source = %source_name,
                error = %error,
                "config reload rejected"
            );
            let _ = shared.events.send(ConfigEvent::ReloadFailed {
                error: error.clone(),
                source: source_name.to_string(),
            });
            return Err(error);
        }
    };

    let current = Arc::new(ConfigSnapshot {
        version: previous.version + 1,
        config,
    });
    {
        let mut guard = shared.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&current);
    }
    tracing::info!(
        event = "config_reloaded",
        version = current.version,
        source = %source_name,
        "config reloaded"
    );
    let _ = shared.events.send(ConfigEvent::Reloaded {
        version: current.version,
        previous,
        current: Arc::clone(&current),
        source: source_name.to_string(),
    });
    Ok(current.version)
}
