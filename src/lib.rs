//! Reelgraph: a polite social-graph crawler
//!
//! This crate walks a film community's member graph breadth-first, recording
//! profile statistics, follow edges and reviews while keeping the request rate
//! under a fixed politeness budget.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod identity;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Reelgraph operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Page fetch failures that reach the caller
///
/// Transient statuses (rate limiting, upstream unavailable) are absorbed by the
/// fetcher's backoff and only show up here as `Exhausted`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Terminal { url: String, status: u16 },

    #[error("HTTP {status} for {url} after {attempts} attempts")]
    Exhausted {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The HTTP status behind this failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Terminal { status, .. } | Self::Exhausted { status, .. } => Some(*status),
            Self::Network { .. } => None,
        }
    }
}

/// Result type alias for Reelgraph operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use identity::{normalize_identity, Identity, VisitedSet};
pub use state::{NodeState, NodeTask};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_status() {
        let terminal = FetchError::Terminal {
            url: "https://letterboxd.com/gone/".to_string(),
            status: 404,
        };
        let exhausted = FetchError::Exhausted {
            url: "https://letterboxd.com/busy/".to_string(),
            status: 503,
            attempts: 5,
        };

        assert_eq!(terminal.status(), Some(404));
        assert_eq!(exhausted.status(), Some(503));
        assert_eq!(
            exhausted.to_string(),
            "HTTP 503 for https://letterboxd.com/busy/ after 5 attempts"
        );
    }

    #[test]
    fn test_errors_convert_into_crawl_error() {
        let err: CrawlError = ConfigError::Validation("bad".to_string()).into();
        assert!(matches!(err, CrawlError::Config(_)));

        let err: CrawlError = storage::StorageError::RunNotFound(3).into();
        assert_eq!(err.to_string(), "Storage error: Run not found: 3");
    }
}
