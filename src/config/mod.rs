//! Configuration module for image grab runs
//!
//! This module provides the `GrabConfig` struct and its type-safe builder
//! for configuring runs with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{GrabConfigBuilder, WithOutputDir, WithQuery};
pub use types::GrabConfig;
