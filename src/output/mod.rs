//! Output module for reporting on stored crawl runs
//!
//! The crawl itself writes through the storage sinks; this module only reads
//! a finished (or interrupted) run back and summarizes it for `--stats`.

pub mod stats;

pub use stats::{load_statistics, print_statistics, render_statistics, CrawlStatistics};
