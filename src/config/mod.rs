//! Configuration module for Reelgraph
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing section falls back to the reference
//! crawl profile (10,000 nodes, 75 edges per direction, 40 seed pages, one
//! review page per node).
//!
//! # Example
//!
//! ```no_run
//! use reelgraph::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reelgraph.toml")).unwrap();
//! println!("Node budget: {}", config.crawler.target_node_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, OutputConfig, PolitenessConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
