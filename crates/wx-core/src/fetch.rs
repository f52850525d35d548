//! Sequence fetcher: downloads every forecast hour of one model run.
//!
//! Hours are requested strictly in order, one at a time. A failed hour is
//! skipped, never retried; after `max_consecutive_failures` misses in a row
//! the remaining hours are abandoned and whatever was retrieved so far is
//! returned. An hour the server simply doesn't publish and a server outage
//! count the same towards that limit.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{FetchConfig, HttpConfig};
use crate::events::{self, EventReceiver, EventSender, FetchEvent};
use crate::frame::{Frame, FrameRequest, FrameSource, Sequence, SequenceRequest};
use crate::model::forecast_hours;
use crate::storage::FrameStore;

pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Why a single forecast hour produced no frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("not found (status {0})")]
    Status(StatusCode),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchPolicy {
    /// Stop the sequence after this many failed hours in a row.
    pub max_consecutive_failures: u32,
    /// Take frames already present in the store instead of requesting them.
    pub reuse_cached: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            reuse_cached: false,
        }
    }
}

impl From<&FetchConfig> for FetchPolicy {
    fn from(cfg: &FetchConfig) -> Self {
        Self {
            max_consecutive_failures: cfg.max_consecutive_failures,
            reuse_cached: cfg.reuse_cached,
        }
    }
}

/// Build the HTTP client used for tile requests.
pub fn build_client(cfg: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()
}

pub struct SequenceFetcher<S> {
    client: reqwest::Client,
    store: Arc<S>,
    policy: FetchPolicy,
}

impl<S> Clone for SequenceFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: FrameStore> SequenceFetcher<S> {
    pub fn new(client: reqwest::Client, store: S, policy: FetchPolicy) -> Self {
        Self {
            client,
            store: Arc::new(store),
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start fetching on a background task.
    ///
    /// The receiver yields progress events followed by exactly one
    /// [`FetchEvent::Finished`], then closes. Call again for a fresh run.
    pub fn spawn(&self, request: SequenceRequest) -> EventReceiver {
        let (tx, rx) = events::channel();
        let fetcher = self.clone();
        tokio::spawn(async move {
            fetcher.run(&request, &tx).await;
        });
        rx
    }

    /// Fetch the whole sequence in-place, emitting events as it goes.
    pub async fn run(&self, request: &SequenceRequest, events: &EventSender) -> Sequence {
        let hours = forecast_hours(&request.model);
        let total = hours.len();
        let limit = self.policy.max_consecutive_failures.max(1);

        info!(
            "fetching {} {} {}.{}: {} forecast hours from {}",
            request.model,
            request.run,
            request.parameter,
            request.region,
            total,
            request.base_url
        );

        let mut frames = Vec::new();
        let mut consecutive_failures = 0u32;

        for (i, hour) in hours.into_iter().enumerate() {
            let frame_request = request.frame(hour);
            match self.fetch_frame(&request.base_url, &frame_request).await {
                Ok(source) => {
                    consecutive_failures = 0;
                    frames.push(Frame::new(request.run, hour, source));
                }
                Err(e) => {
                    warn!("Skipping F{:03} for run {}: {}", hour, request.run, e);
                    consecutive_failures += 1;
                }
            }

            events.progress((i + 1) as f64 / total as f64 * 100.0);

            if consecutive_failures >= limit {
                warn!(
                    "Stopping download: {} consecutive frames were not found",
                    consecutive_failures
                );
                events.progress(100.0);
                break;
            }
        }

        info!(
            "fetch of run {} finished with {} frames",
            request.run,
            frames.len()
        );

        let sequence = Sequence::new(request.run, frames);
        events.emit(FetchEvent::Finished(sequence.clone()));
        sequence
    }

    async fn fetch_frame(
        &self,
        base_url: &str,
        frame: &FrameRequest,
    ) -> Result<FrameSource, FrameError> {
        let key = frame.storage_key();

        if self.policy.reuse_cached {
            if let Some(source) = self.store.get(&key).await {
                debug!("F{:03}: using stored {}", frame.forecast_hour, key);
                return Ok(source);
            }
        }

        let url = frame.url(base_url);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FrameError::Status(status));
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }

        Ok(self.store.put(&key, body).await?)
    }
}
