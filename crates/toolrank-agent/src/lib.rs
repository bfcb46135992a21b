//! toolrank: monthly popularity tracking for software tools.
//!
//! Library half of the `toolrank` binary: configuration, the refresh
//! pipeline, exports and text rendering.

pub mod config;
pub mod export;
pub mod pipeline;
pub mod render;

pub use pipeline::{load_rankings, run_refresh, RefreshReport, RefreshSources};
