//! Error types shared across the download pipeline
//!
//! Session-level failures abort a run; per-candidate failures are
//! recorded in the run summary and never propagate past the engine.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while driving the browser session.
///
/// Any of these is fatal to the run: without a rendered results page
/// there are no candidates to fetch.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Browser could not be launched or the CDP connection dropped
    #[error("browser session unavailable: {0}")]
    Unavailable(String),

    /// Results page never satisfied the readiness condition
    #[error("results page not ready after {waited_ms}ms")]
    NavigationTimeout { waited_ms: u64 },
}

/// Category assigned to every unsuccessful candidate.
///
/// Keys of the `failed` map in [`RunSummary`](crate::engine::RunSummary),
/// so the set is closed and each variant serializes as a stable
/// snake_case string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Browser launch or CDP transport failed before navigation
    SessionUnavailable,
    /// Results page never became ready within the maximum wait
    NavigationTimeout,
    /// HTTP request exceeded the per-fetch timeout
    Timeout,
    /// Transport-level failure (DNS, TLS, reset connection)
    Connection,
    /// Server answered with a non-success status code
    HttpStatus,
    /// Response body exceeded the configured size cap
    TooLarge,
    /// Content-type not in the image allow-list
    UnsupportedType,
    /// Response body was zero bytes
    EmptyBody,
    /// Collision disambiguation ran out of attempts
    WriteExhausted,
    /// Filesystem error while persisting the image
    Io,
    /// Run was cancelled before this candidate completed
    Cancelled,
}

impl FailureKind {
    /// Whether the fetch should be retried once before recording failure.
    ///
    /// Only transport-level problems qualify. A definitive server answer
    /// (status code, oversized body) will not change on a second attempt.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Timeout | Self::Connection)
    }

    /// Stable string form used in logs and the summary map.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionUnavailable => "session_unavailable",
            Self::NavigationTimeout => "navigation_timeout",
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::HttpStatus => "http_status",
            Self::TooLarge => "too_large",
            Self::UnsupportedType => "unsupported_type",
            Self::EmptyBody => "empty_body",
            Self::WriteExhausted => "write_exhausted",
            Self::Io => "io",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&SessionError> for FailureKind {
    fn from(error: &SessionError) -> Self {
        match error {
            SessionError::Unavailable(_) => Self::SessionUnavailable,
            SessionError::NavigationTimeout { .. } => Self::NavigationTimeout,
        }
    }
}
