//! Page data extraction functions.
//!
//! This module provides functions for extracting timing, SEO, security and
//! structural signals from a loaded page. Scripts run inside the browser;
//! only their JSON results cross into Rust.

// Sub-modules
pub mod extractors;
pub mod js_scripts;
pub mod schema;

// Re-exports for public API
pub use extractors::{
    evaluate_into, extract_mixed_content, extract_page_structure, extract_performance_timings,
    extract_seo_signals,
};
