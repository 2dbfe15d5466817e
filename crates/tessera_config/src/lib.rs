//! Parsing and validation of `tessera.toml` configuration files.
//!
//! The `[optimize]` table seeds the detailed-placement passes: pass budget,
//! convergence tolerance, large-net threshold, random seed, and the search
//! scope used when picking target rows.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
