//! toolrank-common: Shared types, errors, and configuration used across all toolrank crates.

pub mod error;
pub mod month;
pub mod table;
pub mod category;
pub mod tracker_config;

// Re-export commonly used types
pub use error::{Result, ToolrankError};
pub use month::MonthKey;
pub use table::{Table, ToolName};
pub use category::{slugify, Category};
pub use tracker_config::{load_config_file, TrackerConfig, ScoringConfig, ViewConfig};
