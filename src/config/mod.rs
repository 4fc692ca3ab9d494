//! Configuration module for website scans
//!
//! This module provides the `ScanConfig` struct and its builder
//! for configuring scans with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::ScanConfigBuilder;
pub use types::{ConfigError, ScanConfig};
