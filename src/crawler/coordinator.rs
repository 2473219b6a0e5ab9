//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop:
//! - Seeding the frontier from the popular-members directory
//! - Walking each dequeued member through its four task groups
//! - Emitting records to the session's sink as they are extracted
//! - Feeding newly discovered members back into the frontier
//! - Closing the run with its terminal status

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::PolitenessScheduler;
use crate::crawler::urls::{EdgeDirection, SiteUrls};
use crate::extract::{parse_network_listing, parse_profile, parse_reviews, parse_seed_listing};
use crate::identity::Identity;
use crate::state::{CrawlSession, CrawlSummary, NodeState, NodeTask};
use crate::storage::{
    ProfileRecord, RecordSink, ReviewRecord, RunStatus, SqliteStorage,
};
use crate::CrawlError;
use chrono::Utc;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    politeness: Arc<PolitenessScheduler>,
    urls: SiteUrls,
    session: CrawlSession,
}

impl Coordinator {
    /// Creates a coordinator writing to the configured SQLite database
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `config_hash` - Hash of the configuration file, stored with the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Failed to open storage or build the HTTP client
    pub fn new(config: Config, config_hash: &str) -> Result<Self, CrawlError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        Self::with_sink(config, Box::new(storage), config_hash)
    }

    /// Creates a coordinator writing to an arbitrary sink
    pub fn with_sink(
        config: Config,
        sink: Box<dyn RecordSink>,
        config_hash: &str,
    ) -> Result<Self, CrawlError> {
        let fetcher = Fetcher::from_config(&config)?;
        let politeness = Arc::new(PolitenessScheduler::from_config(&config.politeness));
        let urls = SiteUrls::new(&config.crawler.base_url)?;
        let session = CrawlSession::open(sink, config_hash, config.crawler.target_node_count)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            politeness,
            urls,
            session,
        })
    }

    /// Runs the crawl to completion and closes the run
    ///
    /// The run is marked `completed` when the frontier drains or the node
    /// budget is reached, and `failed` when the crawl stops on an error the
    /// per-task isolation does not absorb (a sink failure).
    pub async fn run(mut self) -> Result<CrawlSummary, CrawlError> {
        tracing::info!("Starting crawl run {}", self.session.run_id());
        let outcome = self.crawl().await;

        let status = if outcome.is_ok() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };

        match (outcome, self.session.close(status)) {
            (Ok(()), Ok(summary)) => {
                tracing::info!(
                    "Crawl run {} complete: {} members visited, {} accepted, {} profiles, {} edges, {} reviews, {} failed tasks",
                    summary.run_id,
                    summary.nodes_visited,
                    summary.nodes_accepted,
                    summary.profiles,
                    summary.edges,
                    summary.reviews,
                    summary.task_failures
                );
                Ok(summary)
            }
            (Ok(()), Err(e)) => Err(e.into()),
            (Err(e), close_result) => {
                if let Err(close_err) = close_result {
                    tracing::error!("Failed to close crawl run: {}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn crawl(&mut self) -> Result<(), CrawlError> {
        self.seed().await?;

        let start_time = std::time::Instant::now();
        let mut nodes_done = 0usize;

        while let Some(node) = self.session.next_node() {
            self.visit(&node).await?;
            nodes_done += 1;

            if nodes_done % 10 == 0 {
                let rate = nodes_done as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} members visited, {} accepted, {} in frontier, {:.2} members/sec",
                    nodes_done,
                    self.session.visited_count(),
                    self.session.frontier_len(),
                    rate
                );
            }
        }

        tracing::info!("Frontier is empty, crawl complete");
        Ok(())
    }

    /// Fills the frontier from the popular-members directory
    ///
    /// A seed page that cannot be fetched ends seeding with whatever was
    /// collected so far.
    async fn seed(&mut self) -> Result<usize, CrawlError> {
        let max_pages = self.config.crawler.seed_pages;
        let mut candidates = BTreeSet::new();

        for page in 1..=max_pages {
            let url = self.urls.popular_members(page)?;
            let fetched = match self.fetcher.fetch(url.as_str()).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!("Seed page {} failed, stopping seeding: {}", page, e);
                    break;
                }
            };

            let listing = parse_seed_listing(&fetched.body);
            tracing::debug!("Seed page {}: {} members", page, listing.items.len());
            candidates.extend(listing.items);

            if !listing.has_next || page == max_pages {
                break;
            }
            self.politeness.delay().await;
        }

        let accepted = candidates
            .iter()
            .filter(|identity| self.session.try_enqueue(identity))
            .count();

        tracing::info!(
            "Seeded {} members from {} candidates",
            accepted,
            candidates.len()
        );

        // The first profile request follows the last seed page
        if accepted > 0 {
            self.politeness.delay().await;
        }
        Ok(accepted)
    }

    /// Drives one member through every task group
    ///
    /// A failed task is logged and the node moves on to its next state. Only
    /// sink failures stop the crawl.
    async fn visit(&mut self, node: &Identity) -> Result<(), CrawlError> {
        let mut state = NodeState::initial();

        while let Some(task) = state.task() {
            if let Err(e) = self.run_task(node, task).await {
                if matches!(e, CrawlError::Storage(_)) {
                    return Err(e);
                }
                tracing::warn!("{} error for {}: {}", task, node, e);
                self.session.note_task_failure();
            }
            self.politeness.delay().await;
            state = state.next();
        }

        tracing::debug!("Member {} is {}", node, state);
        Ok(())
    }

    async fn run_task(&mut self, node: &Identity, task: NodeTask) -> Result<(), CrawlError> {
        match task {
            NodeTask::Profile => self.fetch_profile(node).await,
            NodeTask::Reviews => self.walk_reviews(node).await,
            NodeTask::FollowingEdges => self.walk_network(node, EdgeDirection::Following).await,
            NodeTask::FollowerEdges => self.walk_network(node, EdgeDirection::Followers).await,
        }
    }

    async fn fetch_profile(&mut self, node: &Identity) -> Result<(), CrawlError> {
        let url = self.urls.profile(node)?;
        let fetched = self.fetcher.fetch(url.as_str()).await?;
        let stats = parse_profile(&fetched.body);

        self.session.emit_profile(&ProfileRecord {
            identity: node.clone(),
            profile_url: url.to_string(),
            followers_count: stats.followers_count,
            following_count: stats.following_count,
            scraped_at: Utc::now(),
        })?;
        Ok(())
    }

    async fn walk_reviews(&mut self, node: &Identity) -> Result<(), CrawlError> {
        let max_pages = self.config.crawler.review_pages_per_node;
        let mut emitted = 0usize;

        for page in 1..=max_pages {
            let url = self.urls.reviews(node, page)?;
            let fetched = self.fetcher.fetch(url.as_str()).await?;
            let listing = parse_reviews(&fetched.body, self.urls.base());

            for entry in listing.items {
                self.session
                    .emit_review(&ReviewRecord::from_entry(node.clone(), entry))?;
                emitted += 1;
            }

            if !listing.has_next || page == max_pages {
                break;
            }
            self.politeness.delay().await;
        }

        tracing::debug!("{} reviews for {}", emitted, node);
        Ok(())
    }

    /// Walks one side of a member's network, up to the per-direction cap
    async fn walk_network(
        &mut self,
        node: &Identity,
        direction: EdgeDirection,
    ) -> Result<(), CrawlError> {
        let cap = self.config.crawler.max_edges_per_direction;
        let max_pages = self.config.crawler.network_pages_per_direction();
        let mut emitted = 0usize;
        let mut discovered = 0usize;

        'pages: for page in 1..=max_pages {
            let url = self.urls.network(node, direction, page)?;
            let fetched = self.fetcher.fetch(url.as_str()).await?;
            let listing = parse_network_listing(&fetched.body);

            for peer in &listing.items {
                self.session.emit_edge(&direction.edge_for(node, peer))?;
                emitted += 1;
                if self.session.try_enqueue(peer) {
                    discovered += 1;
                }
                if emitted >= cap {
                    break 'pages;
                }
            }

            if !listing.has_next || page == max_pages {
                break;
            }
            self.politeness.delay().await;
        }

        tracing::debug!(
            "{} {} edges for {}, {} new members",
            emitted,
            direction.path(),
            node,
            discovered
        );
        Ok(())
    }
}
