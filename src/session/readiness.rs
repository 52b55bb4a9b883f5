//! Readiness polling for the rendered results page
//!
//! `wait_for_navigation()` returns when the HTTP response arrives, but the
//! result grid is rendered by JavaScript afterwards. The page counts as
//! ready once enough thumbnails exist, once a nonzero count stops growing
//! between probes, or once a zero count has held long enough to mean the
//! page genuinely has no results.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::SessionError;

/// CSS selector matching result thumbnails on the rendered page.
///
/// Result anchors wrap each thumbnail and link through `imgres`; the
/// `rg_i` class covers grids where the anchor has not been attached yet.
pub(crate) const RESULT_SELECTOR: &str = "a[href*='imgres'], img.rg_i";

/// Consecutive zero-count probes required before trusting that the page
/// rendered and genuinely has no results. Early probes routinely see zero
/// on any page whose grid has not been painted yet, so zero needs a
/// longer streak than the single repeat a nonzero count needs.
const ZERO_SETTLE_PROBES: u32 = 4;

/// Poll `probe` until the result count settles.
///
/// Ready means the count reached `min_count`, or held unchanged and
/// nonzero across two consecutive probes (the page has rendered all it
/// has). A count pinned at zero settles as `Ok(0)` after
/// [`ZERO_SETTLE_PROBES`] consecutive probes, so a query matching nothing
/// ends as an empty page rather than a timeout. Returns the final count,
/// or `NavigationTimeout` once `max_wait` elapses without any of these.
pub(crate) async fn wait_for_settle<F, Fut>(
    mut probe: F,
    min_count: usize,
    max_wait: Duration,
    poll_interval: Duration,
) -> Result<usize, SessionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = usize>,
{
    let start = Instant::now();
    let mut last_count: Option<usize> = None;
    let mut zero_streak = 0u32;

    loop {
        let count = probe().await;

        if count > 0 && (count >= min_count || last_count == Some(count)) {
            return Ok(count);
        }

        zero_streak = if count == 0 { zero_streak + 1 } else { 0 };
        if zero_streak >= ZERO_SETTLE_PROBES {
            return Ok(0);
        }

        if start.elapsed() >= max_wait {
            return Err(SessionError::NavigationTimeout {
                waited_ms: start.elapsed().as_millis() as u64,
            });
        }

        last_count = Some(count);
        tokio::time::sleep(poll_interval).await;
    }
}
