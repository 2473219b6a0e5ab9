//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordSink trait,
//! plus the read queries used by `--stats` and the tests.

use crate::identity::{normalize_identity, Identity};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use crate::storage::{
    EdgeRecord, ProfileRecord, RelationKind, ReviewRecord, RunRecord, RunStatus,
};
use crate::CrawlError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        let conn = Connection::open(path)?;

        // Every row is committed on insert; WAL keeps that cheap
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===== Run Queries =====

    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                read_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    pub fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                read_run,
            )
            .optional()?;
        Ok(run)
    }

    // ===== Counts =====

    pub fn count_profiles(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM users WHERE run_id = ?1", run_id)
    }

    pub fn count_profiles_missing_counts(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM users WHERE run_id = ?1
             AND (followers_count IS NULL OR following_count IS NULL)",
            run_id,
        )
    }

    pub fn count_edges(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM edges WHERE run_id = ?1", run_id)
    }

    pub fn count_reviews(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM reviews WHERE run_id = ?1", run_id)
    }

    pub fn count_rated_reviews(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM reviews WHERE run_id = ?1 AND rating_float IS NOT NULL",
            run_id,
        )
    }

    /// Number of distinct members appearing on either end of an edge
    pub fn count_graph_members(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM (
                SELECT src_username AS m FROM edges WHERE run_id = ?1
                UNION
                SELECT dst_username AS m FROM edges WHERE run_id = ?1
             )",
            run_id,
        )
    }

    fn count(&self, sql: &str, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params![run_id], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Record Loading =====

    pub fn load_profiles(&self, run_id: i64) -> StorageResult<Vec<ProfileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, profile_url, followers_count, following_count, scraped_at
             FROM users WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(username, profile_url, followers, following, scraped_at)| {
                Ok(ProfileRecord {
                    identity: stored_identity("users", &username)?,
                    profile_url,
                    followers_count: followers.and_then(|c| u64::try_from(c).ok()),
                    following_count: following.and_then(|c| u64::try_from(c).ok()),
                    scraped_at: DateTime::parse_from_rfc3339(&scraped_at)
                        .map_err(|e| StorageError::Corrupt {
                            table: "users",
                            message: format!("scraped_at '{}': {}", scraped_at, e),
                        })?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }

    pub fn load_edges(&self, run_id: i64) -> StorageResult<Vec<EdgeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT src_username, dst_username, relation FROM edges WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(src, dst, relation)| {
                Ok(EdgeRecord {
                    src: stored_identity("edges", &src)?,
                    dst: stored_identity("edges", &dst)?,
                    relation: RelationKind::from_db_string(&relation).ok_or_else(|| {
                        StorageError::Corrupt {
                            table: "edges",
                            message: format!("unknown relation '{}'", relation),
                        }
                    })?,
                })
            })
            .collect()
    }

    pub fn load_reviews(&self, run_id: i64) -> StorageResult<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, film_title, film_url, rating_float, rating_stars, watched_date, review_text
             FROM reviews WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(username, film_title, film_url, rating, rating_stars, watched_date, review_text)| {
                    Ok(ReviewRecord {
                        identity: stored_identity("reviews", &username)?,
                        film_title,
                        film_url,
                        rating,
                        rating_stars,
                        watched_date,
                        review_text,
                    })
                },
            )
            .collect()
    }
}

impl RecordSink for SqliteStorage {
    fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn record_profile(&mut self, run_id: i64, profile: &ProfileRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO users (run_id, username, profile_url, followers_count, following_count, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                profile.identity.as_str(),
                profile.profile_url,
                profile.followers_count.and_then(|c| i64::try_from(c).ok()),
                profile.following_count.and_then(|c| i64::try_from(c).ok()),
                profile.scraped_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn record_edge(&mut self, run_id: i64, edge: &EdgeRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO edges (run_id, src_username, dst_username, relation) VALUES (?1, ?2, ?3, ?4)",
            params![
                run_id,
                edge.src.as_str(),
                edge.dst.as_str(),
                edge.relation.to_db_string()
            ],
        )?;
        Ok(())
    }

    fn record_review(&mut self, run_id: i64, review: &ReviewRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO reviews (run_id, username, film_title, film_url, rating_float, rating_stars, watched_date, review_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                review.identity.as_str(),
                review.film_title,
                review.film_url,
                review.rating,
                review.rating_stars,
                review.watched_date,
                review.review_text,
            ],
        )?;
        Ok(())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }
}

fn read_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
    })
}

fn stored_identity(table: &'static str, username: &str) -> StorageResult<Identity> {
    normalize_identity(username).ok_or_else(|| StorageError::Corrupt {
        table,
        message: format!("invalid username '{}'", username),
    })
}
