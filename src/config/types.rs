use serde::Deserialize;

/// Main configuration structure for Reelgraph
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl budget and traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Origin the member graph is crawled from
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of identities ever enqueued
    #[serde(rename = "target-node-count")]
    pub target_node_count: usize,

    /// Per-node, per-direction edge sampling cap
    #[serde(rename = "max-edges-per-direction")]
    pub max_edges_per_direction: usize,

    /// Number of popular-members listing pages used as seeds
    #[serde(rename = "seed-pages")]
    pub seed_pages: u32,

    /// Number of review pages fetched per node
    #[serde(rename = "review-pages-per-node")]
    pub review_pages_per_node: u32,

    /// Peers shown on one followers/following page
    #[serde(rename = "network-page-size")]
    pub network_page_size: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://letterboxd.com".to_string(),
            target_node_count: 10_000,
            max_edges_per_direction: 75,
            seed_pages: 40,
            review_pages_per_node: 1,
            network_page_size: 30,
        }
    }
}

impl CrawlerConfig {
    /// Number of network listing pages needed to reach the edge cap
    pub fn network_pages_per_direction(&self) -> u32 {
        self.max_edges_per_direction
            .div_ceil(self.network_page_size.max(1)) as u32
    }
}

/// HTTP fetch and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Attempts per logical page fetch, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Backoff time unit (milliseconds); attempt i waits 2^i units plus jitter
    #[serde(rename = "backoff-unit-ms")]
    pub backoff_unit_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_attempts: 5,
            backoff_unit_ms: 1000,
        }
    }
}

/// Randomized pause inserted between outbound requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 2000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "reelgraph-research".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_email: "you@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header: `name/version (contact: email)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (contact: {})",
            self.crawler_name, self.crawler_version, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database holding the three record sinks
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "reelgraph.db".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_pages_rounds_up() {
        let config = CrawlerConfig::default();
        assert_eq!(config.network_pages_per_direction(), 3);

        let config = CrawlerConfig {
            max_edges_per_direction: 60,
            ..CrawlerConfig::default()
        };
        assert_eq!(config.network_pages_per_direction(), 2);

        let config = CrawlerConfig {
            max_edges_per_direction: 91,
            ..CrawlerConfig::default()
        };
        assert_eq!(config.network_pages_per_direction(), 4);
    }

    #[test]
    fn test_user_agent_header() {
        let ua = UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_email: "admin@example.com".to_string(),
        };
        assert_eq!(ua.header_value(), "TestBot/1.0 (contact: admin@example.com)");
    }
}
