//! Core configuration types for image grab runs
//!
//! This module contains the main `GrabConfig` struct holding every knob a
//! run honors. Construction goes through the type-safe builder so the two
//! required fields are always present.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::query::{SearchFilters, SearchQuery};

/// Main configuration struct for an image grab run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabConfig {
    /// Free-text search query
    pub(crate) query: String,

    /// Output directory for downloaded images.
    ///
    /// Created on demand at run start; the engine owns this path for the
    /// lifetime of the run.
    pub(crate) output_dir: PathBuf,

    /// Number of images to download
    pub(crate) count: usize,

    /// Upper bound on concurrently running fetches
    pub(crate) concurrency: usize,

    /// Prefix prepended to every saved filename
    pub(crate) filename_prefix: String,

    /// Advanced search filters forwarded to the results URL
    pub(crate) filters: SearchFilters,

    /// Per-fetch timeout in seconds, covering connect and body streaming
    pub(crate) fetch_timeout_secs: u64,

    /// Responses larger than this many bytes are rejected
    pub(crate) max_image_bytes: u64,

    /// Maximum seconds to wait for the results page to become ready
    pub(crate) max_wait_secs: u64,

    /// Interval between readiness probes in milliseconds
    pub(crate) poll_interval_ms: u64,

    /// Base delay in milliseconds before the single fetch retry
    pub(crate) retry_base_delay_ms: u64,

    /// Run the browser without a visible window
    pub(crate) headless: bool,

    /// User agent sent by both the browser and the fetcher
    pub(crate) user_agent: String,

    /// Referer sent for candidates that carry no referring page
    pub(crate) default_referer: String,

    /// Proxy URL routed through by both the browser and the fetcher.
    ///
    /// `None` means direct connections.
    pub(crate) proxy: Option<String>,

    /// Browser profile directory override.
    ///
    /// `None` means a fresh throwaway profile is created per session and
    /// removed at close.
    #[serde(skip)]
    pub(crate) chrome_data_dir: Option<PathBuf>,
}

impl GrabConfig {
    /// Set a pre-existing browser profile directory.
    ///
    /// The session will not remove this directory at close; cleanup only
    /// applies to profiles the session created itself.
    #[must_use]
    pub fn with_chrome_data_dir(mut self, dir: PathBuf) -> Self {
        self.chrome_data_dir = Some(dir);
        self
    }

    /// Assemble the search query this run executes.
    #[must_use]
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            text: self.query.clone(),
            requested_count: self.count,
            filters: self.filters.clone(),
        }
    }
}
