//! Browser session driving the search results page
//!
//! Owns the browser for the lifetime of one run: launch, navigate to the
//! results URL, wait until the grid renders, hand back a DOM snapshot,
//! tear everything down afterwards.

use chromiumoxide::browser::Browser;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::browser_setup;
use crate::config::GrabConfig;
use crate::error::SessionError;
use crate::query::SearchQuery;

mod readiness;

/// Snapshot of the rendered results page.
///
/// Decouples extraction from the live browser: once the snapshot exists
/// the session can be torn down without invalidating it.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    url: Url,
    html: String,
}

impl RenderedPage {
    #[must_use]
    pub fn new(url: Url, html: String) -> Self {
        Self { url, html }
    }

    /// Final URL after any redirects
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Serialized DOM at snapshot time
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Source of rendered results pages.
///
/// The engine depends on this seam instead of the concrete browser so
/// runs can be driven by canned pages in tests.
pub trait SessionDriver {
    fn open(
        &mut self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<RenderedPage, SessionError>> + Send;
}

/// Outcome of an orderly session shutdown.
#[derive(Debug)]
pub enum CloseOutcome {
    /// Browser exited and the profile directory was removed
    Clean,
    /// Some shutdown steps failed; the run's results are unaffected
    Partial(Vec<String>),
}

/// Live browser session bound to one run.
///
/// Holds the browser, its CDP handler task, and the profile directory.
/// The handler MUST be aborted at shutdown or it runs indefinitely after
/// the browser is gone.
pub struct SearchSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
    max_wait: Duration,
    poll_interval: Duration,
}

impl SearchSession {
    /// Launch a browser for this run.
    ///
    /// A throwaway profile directory is created unless the config supplies
    /// one; a supplied directory is left in place at close.
    pub async fn launch(config: &GrabConfig) -> Result<Self, SessionError> {
        let owns_profile = config.chrome_data_dir().is_none();
        let (browser, handler, user_data_dir) = browser_setup::launch_browser(
            config.headless(),
            config.user_agent(),
            config.chrome_data_dir().cloned(),
            config.proxy(),
        )
        .await
        .map_err(|e| SessionError::Unavailable(format!("{e:#}")))?;

        Ok(Self {
            browser,
            handler,
            user_data_dir: owns_profile.then_some(user_data_dir),
            max_wait: config.max_wait(),
            poll_interval: config.poll_interval(),
        })
    }

    async fn open_results_page(&self, query: &SearchQuery) -> Result<RenderedPage, SessionError> {
        let results_url = query
            .results_url()
            .map_err(|e| SessionError::Unavailable(format!("invalid results URL: {e}")))?;

        info!("Navigating to results page: {results_url}");
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Unavailable(format!("failed to open page: {e}")))?;

        page.goto(results_url.as_str())
            .await
            .map_err(|e| SessionError::Unavailable(format!("navigation failed: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| SessionError::Unavailable(format!("navigation failed: {e}")))?;

        let probe_page = page.clone();
        let count = readiness::wait_for_settle(
            move || {
                let page = probe_page.clone();
                async move {
                    page.find_elements(readiness::RESULT_SELECTOR)
                        .await
                        .map_or(0, |elements| elements.len())
                }
            },
            query.requested_count,
            self.max_wait,
            self.poll_interval,
        )
        .await?;
        debug!("Results page settled with {count} thumbnails");

        // The live URL can differ from the requested one after consent or
        // regional redirects; candidates resolve relative to what the
        // browser actually shows.
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or(results_url);

        let html = page
            .content()
            .await
            .map_err(|e| SessionError::Unavailable(format!("failed to read page content: {e}")))?;

        Ok(RenderedPage::new(final_url, html))
    }

    /// Shut the session down in order: close the browser, wait for the
    /// process to exit, remove the profile directory, stop the handler.
    ///
    /// Cleanup failures never fail the run; they are collected so the
    /// caller can log them.
    pub async fn close(mut self) -> CloseOutcome {
        let mut issues = Vec::new();

        if let Err(e) = self.browser.close().await {
            issues.push(format!("browser close: {e}"));
        }
        if let Err(e) = self.browser.wait().await {
            issues.push(format!("browser wait: {e}"));
        }

        // Profile removal must come after wait(): Chrome releases its file
        // handles only once the process has exited.
        if let Some(dir) = self.user_data_dir.take()
            && let Err(e) = std::fs::remove_dir_all(&dir)
        {
            issues.push(format!("profile cleanup {}: {e}", dir.display()));
        }

        self.handler.abort();

        if issues.is_empty() {
            CloseOutcome::Clean
        } else {
            CloseOutcome::Partial(issues)
        }
    }
}

impl SessionDriver for SearchSession {
    fn open(
        &mut self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<RenderedPage, SessionError>> + Send {
        self.open_results_page(query)
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.handler.abort();
        // Backstop for sessions dropped without close(). Chrome may still
        // hold handles inside the profile, so removal can fail here.
        if let Some(dir) = self.user_data_dir.take() {
            warn!(
                "Session dropped without close; removing profile {}",
                dir.display()
            );
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!("Failed to remove profile directory {}: {e}", dir.display());
            }
        }
    }
}
