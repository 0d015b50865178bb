//! Configuration source capability and location classification.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::config::snapshot::{ApplyOutcome, ConfigApplier};

/// One configured source of configuration documents.
///
/// Constructed once from startup configuration; the tag decides which
/// watcher implementation handles the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Remote document polled over HTTP(S).
    Url(Url),
    /// Local file observed for change notifications.
    File(PathBuf),
}

impl ConfigLocation {
    /// Classify a raw location string.
    ///
    /// Anything that does not parse as an http(s) URL is treated as a
    /// filesystem path.
    pub fn classify(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => ConfigLocation::Url(url),
            _ => ConfigLocation::File(PathBuf::from(raw)),
        }
    }
}

impl std::fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLocation::Url(url) => write!(f, "{url}"),
            ConfigLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Failure to produce a document from a source.
///
/// Always recoverable: the owning watch loop reports it and retries on its
/// next natural cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure reaching a remote source.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote source answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    /// Local file could not be read.
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Something that can produce the current configuration document on demand.
///
/// Fetching never touches the shared snapshot; only the applier mutates it.
/// That split lets fetch failures be observed and logged with no risk of
/// clobbering good state.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Produce the raw bytes of the current document, or fail.
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

/// One fetch-and-apply cycle shared by every watcher loop.
///
/// Failures are reported and swallowed; the previous snapshot stays in
/// place and the loop lives on.
pub(crate) async fn fetch_and_apply(
    source: &dyn ConfigSource,
    applier: &ConfigApplier,
    location: &ConfigLocation,
) {
    match source.fetch().await {
        Ok(raw) => match applier.apply(&raw) {
            Ok(ApplyOutcome::Applied) => {
                tracing::info!(source = %location, "Configuration updated");
            }
            Ok(ApplyOutcome::Unchanged) => {
                tracing::debug!(source = %location, "Configuration unchanged");
            }
            Err(e) => {
                tracing::error!(
                    source = %location,
                    error = %e,
                    "Rejected config update. Keeping current configuration."
                );
            }
        },
        Err(e) => {
            tracing::warn!(
                source = %location,
                error = %e,
                "Failed to fetch config. Keeping current configuration."
            );
        }
    }
}
