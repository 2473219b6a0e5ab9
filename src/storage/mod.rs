//! Storage module for the crawl's output sinks
//!
//! This module handles:
//! - The record types emitted by the crawler (profiles, edges, reviews)
//! - The `RecordSink` trait the crawler writes through
//! - A SQLite implementation holding one table per sink plus a run ledger

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{RecordSink, StorageError, StorageResult};

use crate::extract::ReviewEntry;
use crate::identity::Identity;
use chrono::{DateTime, Utc};

/// Profile statistics observed for one member
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub identity: Identity,
    pub profile_url: String,
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
    pub scraped_at: DateTime<Utc>,
}

/// Directed edge type between two members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Follows,
}

impl RelationKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Follows => "follows",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "follows" => Some(Self::Follows),
            _ => None,
        }
    }
}

/// A directed relationship: `src` relates to `dst`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeRecord {
    pub src: Identity,
    pub dst: Identity,
    pub relation: RelationKind,
}

impl EdgeRecord {
    /// `src` follows `dst`
    pub fn follows(src: Identity, dst: Identity) -> Self {
        Self {
            src,
            dst,
            relation: RelationKind::Follows,
        }
    }
}

/// A review written by `identity`
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub identity: Identity,
    pub film_title: String,
    pub film_url: String,
    pub rating: Option<f64>,
    pub rating_stars: String,
    pub watched_date: Option<String>,
    pub review_text: String,
}

impl ReviewRecord {
    /// Tags an extracted review with its author
    pub fn from_entry(identity: Identity, entry: ReviewEntry) -> Self {
        Self {
            identity,
            film_title: entry.film_title,
            film_url: entry.film_url,
            rating: entry.rating,
            rating_stars: entry.rating_stars,
            watched_date: entry.watched_date,
            review_text: entry.review_text,
        }
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::normalize_identity;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[RunStatus::Running, RunStatus::Completed, RunStatus::Failed] {
            let parsed = RunStatus::from_db_string(status.to_db_string());
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("interrupted"), None);
    }

    #[test]
    fn test_relation_kind_strings() {
        assert_eq!(RelationKind::Follows.to_db_string(), "follows");
        assert_eq!(
            RelationKind::from_db_string("follows"),
            Some(RelationKind::Follows)
        );
        assert_eq!(RelationKind::from_db_string("blocks"), None);
    }

    #[test]
    fn test_review_from_entry_keeps_fields() {
        let entry = ReviewEntry {
            film_title: "Heat".to_string(),
            film_url: "https://letterboxd.com/film/heat/".to_string(),
            rating: None,
            rating_stars: String::new(),
            watched_date: Some("1 Jan 2024".to_string()),
            review_text: "ok".to_string(),
        };
        let jay = normalize_identity("/jay/").unwrap();

        let record = ReviewRecord::from_entry(jay.clone(), entry);
        assert_eq!(record.identity, jay);
        assert_eq!(record.film_title, "Heat");
        assert_eq!(record.rating, None);
        assert_eq!(record.watched_date.as_deref(), Some("1 Jan 2024"));
    }
}
