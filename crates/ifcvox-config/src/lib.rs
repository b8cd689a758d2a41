//! Configuration for the ifcvox service.
//!
//! Settings persist to disk as `config.ron`. Missing sections and fields fall
//! back to defaults, unknown fields are ignored, and command-line flags
//! override whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, RasterConfig, ServerConfig, StorageConfig};
pub use error::ConfigError;
