//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! per-run record counts from the storage layer.

use crate::storage::{RunRecord, SqliteStorage, StorageResult};
use chrono::DateTime;
use std::fmt::Write;

/// Crawl statistics summary for one run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// The run these counts belong to
    pub run: RunRecord,

    /// Profile rows written
    pub profiles: u64,

    /// Profile rows where at least one count could not be read
    pub profiles_missing_counts: u64,

    /// Edge rows written
    pub edges: u64,

    /// Distinct members appearing on either end of an edge
    pub graph_members: u64,

    /// Review rows written
    pub reviews: u64,

    /// Review rows carrying a numeric rating
    pub rated_reviews: u64,

    /// Wall-clock duration, once the run has finished
    pub duration_seconds: Option<i64>,
}

/// Loads statistics for the latest run
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(Some(CrawlStatistics))` - Counts for the most recent run
/// * `Ok(None)` - The database holds no runs yet
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &SqliteStorage) -> StorageResult<Option<CrawlStatistics>> {
    let Some(run) = storage.get_latest_run()? else {
        return Ok(None);
    };

    let duration_seconds = run.finished_at.as_deref().and_then(|finished| {
        let started = DateTime::parse_from_rfc3339(&run.started_at).ok()?;
        let finished = DateTime::parse_from_rfc3339(finished).ok()?;
        Some((finished - started).num_seconds())
    });

    Ok(Some(CrawlStatistics {
        profiles: storage.count_profiles(run.id)?,
        profiles_missing_counts: storage.count_profiles_missing_counts(run.id)?,
        edges: storage.count_edges(run.id)?,
        graph_members: storage.count_graph_members(run.id)?,
        reviews: storage.count_reviews(run.id)?,
        rated_reviews: storage.count_rated_reviews(run.id)?,
        duration_seconds,
        run,
    }))
}

/// Formats statistics as a plain-text report
pub fn render_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Run:");
    let _ = writeln!(out, "  ID: {}", stats.run.id);
    let _ = writeln!(out, "  Status: {}", stats.run.status.to_db_string());
    let _ = writeln!(out, "  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        let _ = writeln!(out, "  Finished: {}", finished);
    }
    if let Some(seconds) = stats.duration_seconds {
        let _ = writeln!(out, "  Duration: {}s", seconds);
    }
    let _ = writeln!(out, "  Config hash: {}", stats.run.config_hash);
    let _ = writeln!(out);

    let _ = writeln!(out, "Records:");
    let _ = writeln!(
        out,
        "  Profiles: {} ({} missing a count)",
        stats.profiles, stats.profiles_missing_counts
    );
    let _ = writeln!(
        out,
        "  Edges: {} across {} members",
        stats.edges, stats.graph_members
    );

    let rated_share = if stats.reviews > 0 {
        (stats.rated_reviews as f64 / stats.reviews as f64) * 100.0
    } else {
        0.0
    };
    let _ = writeln!(
        out,
        "  Reviews: {} ({:.1}% rated)",
        stats.reviews, rated_share
    );

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", render_statistics(stats));
}
