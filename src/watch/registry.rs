//! Watcher orchestration and lifecycle handles.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::snapshot::ConfigApplier;
use crate::watch::poller::UrlPoller;
use crate::watch::source::ConfigLocation;
use crate::watch::watcher::FileWatcher;

/// Failure to set up a watcher for one location.
///
/// Surfaced synchronously from [`WatcherRegistry::start`]; never retried.
#[derive(Debug, Error)]
pub enum WatchSetupError {
    /// The configured file does not exist.
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The OS watch could not be registered.
    #[error("failed to register file watch: {0}")]
    Notify(#[from] notify::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Handle to one running watcher.
pub struct WatcherHandle {
    location: ConfigLocation,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// The source this watcher observes.
    pub fn location(&self) -> &ConfigLocation {
        &self.location
    }

    /// Stop the watcher. Idempotent; safe to call from any task.
    ///
    /// Once this returns the watcher starts no new apply; a cycle already
    /// in flight may still complete.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`WatcherHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the watcher task to exit. Only returns promptly after
    /// cancellation.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Outcome of [`WatcherRegistry::start`]: the watchers that are running
/// plus the locations that failed to start.
pub struct StartReport {
    pub handles: Vec<WatcherHandle>,
    pub failures: Vec<(ConfigLocation, WatchSetupError)>,
}

/// Builds and starts one watcher per configured location.
pub struct WatcherRegistry {
    applier: ConfigApplier,
    poll_interval: Duration,
}

impl WatcherRegistry {
    /// `poll_interval` applies uniformly to every URL location.
    pub fn new(applier: ConfigApplier, poll_interval: Duration) -> Self {
        Self {
            applier,
            poll_interval,
        }
    }

    /// Start one watcher per location.
    ///
    /// A location that fails setup is reported in the result and does not
    /// prevent the remaining locations from starting. A cancelled watcher
    /// is never restarted; call `start` again to watch its location anew.
    pub fn start(&self, locations: Vec<ConfigLocation>) -> StartReport {
        let mut handles = Vec::with_capacity(locations.len());
        let mut failures = Vec::new();

        for location in locations {
            match self.start_one(location.clone()) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::error!(
                        source = %location,
                        error = %e,
                        "Failed to start config watcher"
                    );
                    failures.push((location, e));
                }
            }
        }

        StartReport { handles, failures }
    }

    fn start_one(&self, location: ConfigLocation) -> Result<WatcherHandle, WatchSetupError> {
        let cancel = CancellationToken::new();

        let task = match &location {
            ConfigLocation::Url(url) => {
                let poller =
                    UrlPoller::new(url.clone(), self.poll_interval, self.applier.clone())?;
                tokio::spawn(poller.run(cancel.clone()))
            }
            ConfigLocation::File(path) => {
                let watcher = FileWatcher::new(path.clone(), self.applier.clone())?;
                tokio::spawn(watcher.run(cancel.clone()))
            }
        };

        Ok(WatcherHandle {
            location,
            cancel,
            task,
        })
    }
}
