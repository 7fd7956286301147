//! Dodis-Harvest: a polite archive harvester
//!
//! This crate crawls the paginated search API of a document archive, downloads
//! document records together with their transcriptions and facsimiles, and
//! stores them in a flat documents directory for later text processing.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Dodis-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Malformed JSON from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Dodis-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::crawl;
pub use output::CrawlSummary;
pub use state::SitemapState;
pub use url::{classify, extract_id, Classified, DocumentKind};
