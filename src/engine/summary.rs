//! Run accounting

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::FailureKind;

/// Final accounting for one run.
///
/// `attempted` counts candidates handed to the fetcher, which can be
/// lower than `requested` when the page offered fewer results. Every
/// attempted candidate lands in `succeeded` or in exactly one `failed`
/// bucket.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub requested: usize,
    pub attempted: usize,
    pub succeeded: usize,
    /// Failure counts keyed by category, ordered for stable output
    pub failed: BTreeMap<FailureKind, u64>,
}

impl RunSummary {
    pub(crate) fn new(requested: usize) -> Self {
        Self {
            requested,
            attempted: 0,
            succeeded: 0,
            failed: BTreeMap::new(),
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub(crate) fn record_failure(&mut self, kind: FailureKind) {
        *self.failed.entry(kind).or_insert(0) += 1;
    }

    /// Total candidates that failed, across all categories.
    #[must_use]
    pub fn failed_total(&self) -> u64 {
        self.failed.values().sum()
    }
}
