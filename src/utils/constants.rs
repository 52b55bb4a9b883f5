//! Shared configuration constants for iget
//!
//! Default values used throughout the pipeline. Every one of them can be
//! overridden through the config builder; these are the values a run gets
//! when the caller says nothing.

/// Default number of images to download per run
pub const DEFAULT_COUNT: usize = 10;

/// Default number of concurrent fetch workers
///
/// Image hosts are many distinct origins, so a handful of parallel
/// connections is safe. Raising this mostly shifts the bottleneck to the
/// slowest host in the batch.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Per-fetch timeout: 20 seconds
///
/// Applies to the whole request including body streaming. Hosts slower
/// than this are recorded as `Timeout` failures after one retry.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

/// Maximum accepted image size: 5 MiB
///
/// Checked against `Content-Length` before the body is read, and again
/// while streaming for servers that omit the header.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Maximum wait for the results page to become ready: 10 seconds
pub const DEFAULT_MAX_WAIT_SECS: u64 = 10;

/// Interval between readiness probes of the results page
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Base delay for the single fetch retry
///
/// The actual delay is this base plus random jitter, so simultaneous
/// retries against one host do not land in the same instant.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Default filename prefix for downloaded images
pub const DEFAULT_FILENAME_PREFIX: &str = "img";

/// Desktop Chrome user agent, sent by the browser session and by every
/// image fetch
///
/// Chrome 132 stable. A new stable ships roughly every four weeks; bump
/// this a few times a year so the claimed version stays plausible.
/// Release calendar: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Referer sent with every image fetch unless the candidate carries a
/// referring page of its own
///
/// Many hosts reject image requests without a plausible referer. The
/// image search origin is the referer a real browser would send when
/// opening a result.
pub const DEFAULT_REFERER: &str = "https://images.google.com/";

/// Accept header for image fetches, mirroring what Chrome sends for an
/// `<img>` subresource request
pub const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";
