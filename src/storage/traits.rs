//! Sink trait and storage error types
//!
//! The crawler hands every record to a `RecordSink` the moment it is
//! extracted; it never holds records itself.

use crate::storage::{EdgeRecord, ProfileRecord, ReviewRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt row in {table}: {message}")]
    Corrupt { table: &'static str, message: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for the three record streams of a crawl run
///
/// Writes are appended in call order. Implementations must make each record
/// durable before returning, so a crawl that stops early keeps everything
/// emitted so far.
pub trait RecordSink: Send {
    /// Opens a new run and returns its ID
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file that drove the run
    fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Appends a profile row
    fn record_profile(&mut self, run_id: i64, profile: &ProfileRecord) -> StorageResult<()>;

    /// Appends an edge row
    fn record_edge(&mut self, run_id: i64, edge: &EdgeRecord) -> StorageResult<()>;

    /// Appends a review row
    fn record_review(&mut self, run_id: i64, review: &ReviewRecord) -> StorageResult<()>;

    /// Closes the run with its terminal status
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;
}
