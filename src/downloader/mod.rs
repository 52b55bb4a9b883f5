//! Concurrent image fetching
//!
//! Turns candidates into byte buffers. Each fetch carries browser-like
//! headers, honors the per-fetch timeout and size cap, retries once on
//! transport failure, and folds every outcome into a `FetchResult` so one
//! bad host can never end the run.

use anyhow::Context;
use futures::StreamExt;
use futures::stream;
use log::{debug, warn};
use reqwest::{Client, Proxy};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::GrabConfig;
use crate::error::FailureKind;
use crate::extractor::ImageCandidate;
use crate::utils::IMAGE_ACCEPT;

mod retry;

/// Outcome of fetching one candidate.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Success {
        candidate: ImageCandidate,
        /// Declared Content-Type header, if the server sent one
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
    Failure {
        candidate: ImageCandidate,
        kind: FailureKind,
    },
}

impl FetchResult {
    /// The candidate this outcome belongs to.
    #[must_use]
    pub fn candidate(&self) -> &ImageCandidate {
        match self {
            Self::Success { candidate, .. } | Self::Failure { candidate, .. } => candidate,
        }
    }
}

/// HTTP fetcher shared by all workers of a run.
pub struct Fetcher {
    client: Client,
    user_agent: String,
    default_referer: String,
    timeout: Duration,
    max_bytes: u64,
    retry_base_delay: Duration,
}

impl Fetcher {
    /// Build the shared client, routed through the configured proxy when
    /// one is set.
    pub fn new(config: &GrabConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(proxy) = config.proxy() {
            let proxy =
                Proxy::all(proxy).with_context(|| format!("invalid proxy URL '{proxy}'"))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().context("failed to build the HTTP client")?;
        Ok(Self {
            client,
            user_agent: config.user_agent().to_string(),
            default_referer: config.default_referer().to_string(),
            timeout: config.fetch_timeout(),
            max_bytes: config.max_image_bytes(),
            retry_base_delay: config.retry_base_delay(),
        })
    }

    /// Fetch all candidates with up to `concurrency` requests in flight.
    ///
    /// The returned sequence has the same length and order as the input
    /// regardless of completion order; callers depend on rank order.
    pub async fn fetch_all(
        &self,
        candidates: Vec<ImageCandidate>,
        concurrency: usize,
        cancel: &CancellationToken,
    ) -> Vec<FetchResult> {
        stream::iter(candidates)
            .map(|candidate| self.fetch_one(candidate, cancel))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Fetch one candidate, retrying once on transport failure.
    pub async fn fetch_one(
        &self,
        candidate: ImageCandidate,
        cancel: &CancellationToken,
    ) -> FetchResult {
        let mut retries = 0u32;
        loop {
            if cancel.is_cancelled() {
                return FetchResult::Failure {
                    candidate,
                    kind: FailureKind::Cancelled,
                };
            }

            let outcome = tokio::select! {
                () = cancel.cancelled() => Err(FailureKind::Cancelled),
                result = self.request(&candidate) => result,
            };

            match outcome {
                Ok((content_type, bytes)) => {
                    debug!("Fetched {} ({} bytes)", candidate.source_url, bytes.len());
                    return FetchResult::Success {
                        candidate,
                        content_type,
                        bytes,
                    };
                }
                Err(kind) if kind.is_retryable() && retries == 0 => {
                    let delay = retry::backoff_delay(retries, self.retry_base_delay);
                    warn!(
                        "Transient {kind} fetching {}, retrying in {}ms",
                        candidate.source_url,
                        delay.as_millis()
                    );
                    retries += 1;
                    tokio::select! {
                        () = cancel.cancelled() => {
                            return FetchResult::Failure {
                                candidate,
                                kind: FailureKind::Cancelled,
                            };
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                Err(kind) => {
                    warn!("Giving up on {}: {kind}", candidate.source_url);
                    return FetchResult::Failure { candidate, kind };
                }
            }
        }
    }

    /// One HTTP attempt, classifying every way a response can disqualify
    /// itself.
    async fn request(
        &self,
        candidate: &ImageCandidate,
    ) -> Result<(Option<String>, Vec<u8>), FailureKind> {
        // Hosts reject image requests lacking a plausible referer or user
        // agent; that rejection is an expected per-item failure, not a bug.
        let referer = candidate
            .referring_page_url
            .as_ref()
            .map_or(self.default_referer.as_str(), Url::as_str);

        let response = self
            .client
            .get(candidate.source_url.clone())
            .timeout(self.timeout)
            .header("User-Agent", &self.user_agent)
            .header("Referer", referer)
            .header("Accept", IMAGE_ACCEPT)
            .send()
            .await
            .map_err(|e| retry::classify(&e))?;

        if !response.status().is_success() {
            warn!(
                "HTTP {} fetching {}",
                response.status(),
                candidate.source_url
            );
            return Err(FailureKind::HttpStatus);
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        // Enforce the size cap BEFORE downloading when the server declares
        // a length
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.max_bytes {
            return Err(FailureKind::TooLarge);
        }

        let mut buffer = if expected_size > 0 {
            Vec::with_capacity(expected_size as usize)
        } else {
            Vec::new()
        };

        // Stream with size checking for servers that omit Content-Length
        let mut stream = response.bytes_stream();
        let mut total_size = 0u64;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| retry::classify(&e))?;

            // Check BEFORE accumulating
            let new_total = total_size + chunk.len() as u64;
            if new_total > self.max_bytes {
                return Err(FailureKind::TooLarge);
            }

            buffer.extend_from_slice(&chunk);
            total_size = new_total;
        }

        Ok((content_type, buffer))
    }
}
