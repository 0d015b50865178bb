//! Remote configuration polling.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::snapshot::ConfigApplier;
use crate::watch::registry::WatchSetupError;
use crate::watch::source::{fetch_and_apply, ConfigLocation, ConfigSource, FetchError};

// Per-request cap; a hung fetch releases the loop before the next tick.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

struct UrlSource {
    client: reqwest::Client,
    url: Url,
}

#[async_trait]
impl ConfigSource for UrlSource {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Polls a remote configuration document on a fixed cadence.
pub struct UrlPoller {
    source: UrlSource,
    location: ConfigLocation,
    interval: Duration,
    applier: ConfigApplier,
}

impl UrlPoller {
    pub fn new(
        url: Url,
        interval: Duration,
        applier: ConfigApplier,
    ) -> Result<Self, WatchSetupError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

        Ok(Self {
            location: ConfigLocation::Url(url.clone()),
            source: UrlSource { client, url },
            interval,
            applier,
        })
    }

    /// Drive the poll loop until cancelled.
    ///
    /// The first cycle runs immediately, then one per interval tick. The
    /// fetch is awaited in the loop body, so at most one request is ever in
    /// flight; ticks that elapse while a fetch is outstanding are skipped,
    /// not queued.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            url = %self.source.url,
            interval_secs = self.interval.as_secs(),
            "Config poller started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // Cancellation wins over a ready tick so no new fetch starts
            // after cancel() has taken effect.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(url = %self.source.url, "Config poller cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    fetch_and_apply(&self.source, &self.applier, &self.location).await;
                }
            }
        }
    }
}
