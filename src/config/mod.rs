//! Configuration management for sidebar-keeper
//!
//! - **overrides**: per-activity sidebar/maximize overrides and their resolution
//! - **settings**: the JSON config file loaded at startup

pub mod overrides;
pub mod settings;

// Re-export commonly used types
pub use overrides::{OverrideEntry, OverrideRegistry};
pub use settings::Config;
