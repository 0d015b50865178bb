//! Configuration file watching for hot reload.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::snapshot::ConfigApplier;
use crate::watch::registry::WatchSetupError;
use crate::watch::source::{fetch_and_apply, ConfigLocation, ConfigSource, FetchError};

struct FileSource {
    path: PathBuf,
}

#[async_trait]
impl ConfigSource for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// Watches a local configuration file and re-applies it on change.
pub struct FileWatcher {
    source: FileSource,
    location: ConfigLocation,
    applier: ConfigApplier,
    // Owns the OS-level watch registration for the watcher's lifetime.
    watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<Event>,
}

impl FileWatcher {
    /// Register an OS watch for `path`.
    ///
    /// Fails if the path does not exist. The watch is placed on the parent
    /// directory and filtered to the file name, so it survives editors and
    /// deploy tools that replace the file by rename under the same path.
    pub fn new(path: PathBuf, applier: ConfigApplier) -> Result<Self, WatchSetupError> {
        if !path.exists() {
            return Err(WatchSetupError::MissingFile(path));
        }

        let (tx, events) = mpsc::unbounded_channel();
        let file_name = path.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    // Some backends omit paths; forward those rather than
                    // risk missing a change.
                    let matches_file = event.paths.is_empty()
                        || event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == file_name.as_deref());
                    if matches_file && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(event);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            notify::Config::default(),
        )?;

        let watch_root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            location: ConfigLocation::File(path.clone()),
            source: FileSource { path },
            applier,
            watcher,
            events,
        })
    }

    /// Drive the watch loop until cancelled.
    ///
    /// Applies the file once on start, then once per change notification,
    /// one notification at a time. Bursts from multi-write editors collapse
    /// into no-op re-applies via the applier's checksum check.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(path = %self.location, "Config watcher started");

        fetch_and_apply(&self.source, &self.applier, &self.location).await;

        loop {
            // Cancellation wins over a pending event so no new apply starts
            // after cancel() has taken effect.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(path = %self.location, "Config watcher cancelled");
                    break;
                }
                event = self.events.recv() => {
                    match event {
                        Some(_) => {
                            tracing::info!(path = %self.location, "Config file change detected, reloading...");
                            fetch_and_apply(&self.source, &self.applier, &self.location).await;
                        }
                        // Event sender gone; nothing left to watch.
                        None => break,
                    }
                }
            }
        }

        // Releases the OS watch handle.
        drop(self.watcher);
    }
}
