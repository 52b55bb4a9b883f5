//! Disk persistence for fetched images
//!
//! Validates the content type, derives the destination name, and writes
//! atomically: either the full byte content lands at the final path or no
//! file is left behind.

use log::{debug, warn};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use crate::downloader::FetchResult;
use crate::error::FailureKind;
use crate::extractor::ImageCandidate;

mod content_type;
mod filename;

/// Collision disambiguation attempts before giving up on a candidate
const MAX_NAME_ATTEMPTS: u32 = 10;

/// A file that landed on disk.
#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub source_candidate: ImageCandidate,
    pub byte_size: u64,
}

/// Outcome of committing one fetch result.
#[derive(Debug)]
pub enum CommitOutcome {
    Written(WrittenFile),
    Rejected {
        candidate: ImageCandidate,
        reason: FailureKind,
    },
}

/// Writes validated images into the run's output directory.
pub struct ContentSaver {
    output_dir: PathBuf,
    filename_prefix: String,
}

impl ContentSaver {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, filename_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            filename_prefix: filename_prefix.into(),
        }
    }

    /// Commit one fetch result to disk.
    ///
    /// Fetch failures pass through with their original kind; success
    /// bodies are gated on content type and emptiness before anything
    /// touches disk. Every outcome is a `CommitOutcome`, never an error.
    pub fn commit(&self, result: FetchResult) -> CommitOutcome {
        let (candidate, content_type, bytes) = match result {
            FetchResult::Failure { candidate, kind } => {
                return CommitOutcome::Rejected {
                    candidate,
                    reason: kind,
                };
            }
            FetchResult::Success {
                candidate,
                content_type,
                bytes,
            } => (candidate, content_type, bytes),
        };

        let Some(resolved) = content_type::resolve(content_type.as_deref(), &bytes) else {
            warn!(
                "Rejecting {}: undeterminable content type",
                candidate.source_url
            );
            return CommitOutcome::Rejected {
                candidate,
                reason: FailureKind::UnsupportedType,
            };
        };

        let Some(extension) = content_type::extension_for(&resolved) else {
            warn!(
                "Rejecting {}: unsupported type {resolved}",
                candidate.source_url
            );
            return CommitOutcome::Rejected {
                candidate,
                reason: FailureKind::UnsupportedType,
            };
        };

        if bytes.is_empty() {
            warn!("Rejecting {}: empty body", candidate.source_url);
            return CommitOutcome::Rejected {
                candidate,
                reason: FailureKind::EmptyBody,
            };
        }

        match self.write_disambiguated(&candidate, extension, &bytes) {
            Ok(path) => {
                debug!("Saved {} -> {}", candidate.source_url, path.display());
                CommitOutcome::Written(WrittenFile {
                    path,
                    byte_size: bytes.len() as u64,
                    source_candidate: candidate,
                })
            }
            Err(reason) => CommitOutcome::Rejected { candidate, reason },
        }
    }

    /// Write bytes to a temp file in the output directory, then rename to
    /// a non-colliding destination name.
    ///
    /// `persist_noclobber` fails instead of replacing an existing file,
    /// so concurrent runs sharing a directory cannot overwrite each
    /// other's output. The temp file lives in the output directory itself
    /// to keep the rename on one filesystem.
    fn write_disambiguated(
        &self,
        candidate: &ImageCandidate,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, FailureKind> {
        let mut temp_file = NamedTempFile::new_in(&self.output_dir).map_err(|e| {
            warn!(
                "Failed to create temp file in {}: {e}",
                self.output_dir.display()
            );
            FailureKind::Io
        })?;
        temp_file.write_all(bytes).map_err(|e| {
            warn!("Failed to write image bytes: {e}");
            FailureKind::Io
        })?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name =
                filename::destination_name(candidate, &self.filename_prefix, extension, attempt);
            let target = self.output_dir.join(name);

            match temp_file.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    // Name taken; reuse the temp file for the next attempt.
                    temp_file = e.file;
                }
                Err(e) => {
                    warn!("Failed to persist {}: {}", target.display(), e.error);
                    return Err(FailureKind::Io);
                }
            }
        }

        // Temp file drops here, leaving nothing behind.
        warn!(
            "Exhausted {MAX_NAME_ATTEMPTS} name attempts for {}",
            candidate.source_url
        );
        Err(FailureKind::WriteExhausted)
    }
}
