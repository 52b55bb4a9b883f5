pub mod browser_setup;
pub mod config;
pub mod downloader;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod query;
pub mod saver;
pub mod session;
pub mod utils;

pub use config::{GrabConfig, GrabConfigBuilder};
pub use downloader::{FetchResult, Fetcher};
pub use engine::{RunSummary, run, run_with_driver};
pub use error::{FailureKind, SessionError};
pub use extractor::ImageCandidate;
pub use query::{
    FileType, ImageSize, ImageType, SearchFilters, SearchQuery, SizeThreshold, UsageRights,
};
pub use saver::{CommitOutcome, ContentSaver, WrittenFile};
pub use session::{CloseOutcome, RenderedPage, SearchSession, SessionDriver};
