//! Run orchestration
//!
//! Sequences session, extraction, fetching, and persistence, and owns the
//! summary. A run always completes with a `RunSummary`: session-level
//! failures produce a zero-attempt summary instead of an error crossing
//! the pipeline boundary.

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::GrabConfig;
use crate::downloader::Fetcher;
use crate::error::FailureKind;
use crate::extractor;
use crate::saver::{CommitOutcome, ContentSaver};
use crate::session::{CloseOutcome, SearchSession, SessionDriver};

mod summary;

pub use summary::RunSummary;

/// Execute a full run: launch a browser session, drive it to completion,
/// tear it down.
///
/// Shutdown problems are logged, never surfaced; by that point the
/// summary is already decided.
pub async fn run(config: &GrabConfig, cancel: &CancellationToken) -> RunSummary {
    if cancel.is_cancelled() {
        let mut summary = RunSummary::new(config.count());
        summary.record_failure(FailureKind::Cancelled);
        return summary;
    }

    let mut session = match SearchSession::launch(config).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Session unavailable: {e}");
            let mut summary = RunSummary::new(config.count());
            summary.record_failure(FailureKind::from(&e));
            return summary;
        }
    };

    let summary = run_with_driver(&mut session, config, cancel).await;

    if let CloseOutcome::Partial(issues) = session.close().await {
        for issue in issues {
            warn!("Session shutdown issue: {issue}");
        }
    }

    summary
}

/// Drive one run against an already-open session.
///
/// Split from [`run`] so callers can substitute their own
/// [`SessionDriver`] for the real browser.
pub async fn run_with_driver<D: SessionDriver>(
    driver: &mut D,
    config: &GrabConfig,
    cancel: &CancellationToken,
) -> RunSummary {
    let query = config.search_query();
    let mut summary = RunSummary::new(query.requested_count);

    if cancel.is_cancelled() {
        summary.record_failure(FailureKind::Cancelled);
        return summary;
    }

    let page = match driver.open(&query).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Run aborted before extraction: {e}");
            summary.record_failure(FailureKind::from(&e));
            return summary;
        }
    };

    let candidates = extractor::extract(&page, query.requested_count);
    summary.attempted = candidates.len();
    if candidates.is_empty() {
        info!("Results page yielded no candidates for '{}'", config.query());
        return summary;
    }
    info!(
        "Fetching {} of {} requested images for '{}'",
        summary.attempted,
        summary.requested,
        config.query()
    );

    if let Err(e) = std::fs::create_dir_all(config.output_dir()) {
        warn!(
            "Cannot create output directory {}: {e}",
            config.output_dir().display()
        );
        for _ in &candidates {
            summary.record_failure(FailureKind::Io);
        }
        return summary;
    }

    let fetcher = match Fetcher::new(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            warn!("Cannot build the HTTP client: {e:#}");
            for _ in &candidates {
                summary.record_failure(FailureKind::Connection);
            }
            return summary;
        }
    };
    let saver = ContentSaver::new(config.output_dir(), config.filename_prefix());

    let results = fetcher
        .fetch_all(candidates, config.concurrency(), cancel)
        .await;

    for result in results {
        match saver.commit(result) {
            CommitOutcome::Written(file) => {
                info!("Saved {}", file.path.display());
                summary.record_success();
            }
            CommitOutcome::Rejected { candidate, reason } => {
                info!("Failed {} ({reason})", candidate.source_url);
                summary.record_failure(reason);
            }
        }
    }

    info!(
        "Run complete: {}/{} succeeded, {} failed",
        summary.succeeded,
        summary.attempted,
        summary.failed_total()
    );
    summary
}
