use serde::Deserialize;

/// Main configuration structure for Dodis-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Worker pool and request pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Interval between two request starts across the whole pool (milliseconds)
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,

    /// Deadline for a single request, body included (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Capacity of the channel carrying fetch results to the router
    #[serde(default = "default_result_buffer")]
    pub result_buffer: usize,

    /// Maximum number of document records post-processed at once
    #[serde(default = "default_post_process_limit")]
    pub post_process_limit: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            request_interval_ms: default_request_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            result_buffer: default_result_buffer(),
            post_process_limit: default_post_process_limit(),
        }
    }
}

/// Remote archive and crawl entry point
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchiveConfig {
    /// Base URL of the archive (e.g. "https://dodis.ch")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sitemap page the crawl starts from
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Language code documents must carry, or "all"
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_page: default_start_page(),
            language: default_language(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory every downloaded file is written to
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            documents_dir: default_documents_dir(),
        }
    }
}

fn default_workers() -> usize {
    8
}

fn default_request_interval_ms() -> u64 {
    400
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_result_buffer() -> usize {
    64
}

fn default_post_process_limit() -> usize {
    16
}

fn default_base_url() -> String {
    "https://dodis.ch".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_language() -> String {
    "all".to_string()
}

fn default_documents_dir() -> String {
    "docs".to_string()
}
