//! Debounced file watching feeding the store's reload queue.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use lethe_core::errors::ConfigError;

use crate::store::ConfigStore;

/// Keeps a file watch alive. Dropping it stops watching.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ConfigStore {
    /// Reload from `path` whenever it changes. Bursts of change events are
    /// collapsed: a reload runs once no event arrived for `debounce`.
    ///
    /// The parent directory is watched so editors that replace the file
    /// by rename are picked up too.
    pub fn watch_file(
        &self,
        path: impl Into<PathBuf>,
        debounce: Duration,
    ) -> Result<ConfigWatcher, ConfigError> {
        let path = path.into();
        let io_err = |e: notify::Error| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let file_name = path.file_name().map(|n| n.to_os_string());
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
            ) {
                return;
            }
            let ours = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if ours {
                let _ = tx.send(());
            }
        })
        .map_err(io_err)?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(io_err)?;

        let task = tokio::spawn(debounce_loop(self.clone(), path.clone(), rx, debounce));
        tracing::info!(path = %path.display(), "watching config file");

        Ok(ConfigWatcher {
            _watcher: watcher,
            task,
            path,
        })
    }
}

async fn debounce_loop(
    store: ConfigStore,
    path: PathBuf,
    mut rx: mpsc::UnboundedReceiver<()>,
    debounce: Duration,
) {
    while rx.recv().await.is_some() {
        // Quiet period: keep extending while events keep arriving.
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }
        if let Err(e) = store.reload_from_file(&path).await {
            tracing::debug!(path = %path.display(), error = %e, "watched reload rejected");
        }
    }
}
