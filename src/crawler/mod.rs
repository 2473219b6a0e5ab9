//! Crawler module for member graph traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry and backoff
//! - Randomized politeness pacing between requests
//! - The URL layout of the origin site
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod scheduler;
mod urls;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, is_transient, FetchedPage, Fetcher, RetryPolicy};
pub use scheduler::PolitenessScheduler;
pub use urls::{EdgeDirection, SiteUrls};

use crate::config::Config;
use crate::state::CrawlSummary;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the output database and start a run
/// 2. Seed the frontier from the popular-members directory
/// 3. Visit members breadth-first until the frontier drains or the budget is hit
/// 4. Close the run with its terminal status
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file content
pub async fn crawl(config: Config, config_hash: &str) -> Result<CrawlSummary, CrawlError> {
    Coordinator::new(config, config_hash)?.run().await
}
