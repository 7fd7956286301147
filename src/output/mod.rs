//! Output module for crawl results and exports
//!
//! This module handles:
//! - Recording crawl statistics and printing the final summary
//! - Exporting extracted text and tags as spaCy training input

mod spacy;
pub mod stats;

pub use spacy::{to_spacy, SpacyInput};
pub use stats::{print_summary, CrawlStatistics, CrawlSummary};
