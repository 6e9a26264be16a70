//! Configuration for the Tessera terrain tools.
//!
//! Settings persist to disk as RON, can be overridden from the command line
//! via clap, and support change detection for hot-reload.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, MaskConfig, OutputConfig, WorldConfig, default_config_dir};
pub use error::ConfigError;
