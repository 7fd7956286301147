//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SitemapState`: position of the crawl within the archive's paginated listing

mod sitemap_state;

// Re-export main types
pub use sitemap_state::{SitemapState, ALL_LANGUAGES};
