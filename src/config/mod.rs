//! Configuration module for Dodis-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) yields a
//! configuration that crawls the public archive with 8 workers.
//!
//! # Example
//!
//! ```no_run
//! use dodis_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArchiveConfig, Config, CrawlerConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
