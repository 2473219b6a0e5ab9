//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `NodeState`: The per-node walk (profile, reviews, following, followers)
//! - `CrawlSession`: Frontier, visited set and sink of one crawl run

mod node_state;
mod session;

pub use node_state::{NodeState, NodeTask};
pub use session::{CrawlSession, CrawlSummary};
