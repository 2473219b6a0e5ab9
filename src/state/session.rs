//! Crawl session: the frontier, the visited set and the open sink of one run
//!
//! Every component that enqueues members or emits records goes through the
//! session, so there is exactly one place where dedup, the node budget and
//! sink ownership are enforced.

use crate::identity::{Identity, VisitedSet};
use crate::storage::{
    EdgeRecord, ProfileRecord, RecordSink, ReviewRecord, RunStatus, StorageResult,
};
use std::collections::VecDeque;

/// Counters reported when a session closes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub run_id: i64,
    pub nodes_accepted: usize,
    pub nodes_visited: usize,
    pub profiles: usize,
    pub edges: usize,
    pub reviews: usize,
    pub task_failures: usize,
}

/// State owned by a single crawl run
pub struct CrawlSession {
    visited: VisitedSet,
    frontier: VecDeque<Identity>,
    target_node_count: usize,
    sink: Box<dyn RecordSink>,
    summary: CrawlSummary,
    closed: bool,
}

impl CrawlSession {
    /// Opens a run on `sink` and returns an empty session
    pub fn open(
        mut sink: Box<dyn RecordSink>,
        config_hash: &str,
        target_node_count: usize,
    ) -> StorageResult<Self> {
        let run_id = sink.begin_run(config_hash)?;
        tracing::debug!("Opened crawl run {}", run_id);

        Ok(Self {
            visited: VisitedSet::new(),
            frontier: VecDeque::new(),
            target_node_count,
            sink,
            summary: CrawlSummary {
                run_id,
                ..CrawlSummary::default()
            },
            closed: false,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.summary.run_id
    }

    /// Accepts `identity` into the frontier if it is new and the budget allows
    ///
    /// Returns true when the identity was appended.
    pub fn try_enqueue(&mut self, identity: &Identity) -> bool {
        if self.visited.insert_within(identity, self.target_node_count) {
            self.frontier.push_back(identity.clone());
            true
        } else {
            false
        }
    }

    /// Pops the next member to visit, in FIFO order
    pub fn next_node(&mut self) -> Option<Identity> {
        if self.visited.len() > self.target_node_count {
            return None;
        }
        let node = self.frontier.pop_front()?;
        self.summary.nodes_visited += 1;
        Some(node)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn emit_profile(&mut self, profile: &ProfileRecord) -> StorageResult<()> {
        self.sink.record_profile(self.summary.run_id, profile)?;
        self.summary.profiles += 1;
        Ok(())
    }

    pub fn emit_edge(&mut self, edge: &EdgeRecord) -> StorageResult<()> {
        self.sink.record_edge(self.summary.run_id, edge)?;
        self.summary.edges += 1;
        Ok(())
    }

    pub fn emit_review(&mut self, review: &ReviewRecord) -> StorageResult<()> {
        self.sink.record_review(self.summary.run_id, review)?;
        self.summary.reviews += 1;
        Ok(())
    }

    /// Counts a task group that failed and was skipped
    pub fn note_task_failure(&mut self) {
        self.summary.task_failures += 1;
    }

    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    /// Marks the run with its terminal status and releases the sink
    ///
    /// A session dropped without being closed (a panic, or a cancelled crawl
    /// future) marks its run `failed` instead.
    pub fn close(mut self, status: RunStatus) -> StorageResult<CrawlSummary> {
        self.closed = true;
        self.sink.finish_run(self.summary.run_id, status)?;
        self.summary.nodes_accepted = self.visited.len();
        Ok(self.summary.clone())
    }
}

impl Drop for CrawlSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        tracing::warn!(
            "Crawl run {} dropped before closing, marking it failed",
            self.summary.run_id
        );
        if let Err(e) = self.sink.finish_run(self.summary.run_id, RunStatus::Failed) {
            tracing::error!("Failed to close crawl run {}: {}", self.summary.run_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::normalize_identity;
    use crate::storage::{StorageError, SqliteStorage};
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    fn ident(name: &str) -> Identity {
        normalize_identity(name).unwrap()
    }

    /// Sink that remembers every terminal status it was closed with
    #[derive(Default)]
    struct RecordingSink {
        finished: Arc<Mutex<Vec<RunStatus>>>,
        fail_edges: bool,
    }

    impl RecordSink for RecordingSink {
        fn begin_run(&mut self, _config_hash: &str) -> StorageResult<i64> {
            Ok(7)
        }

        fn record_profile(&mut self, _run_id: i64, _p: &ProfileRecord) -> StorageResult<()> {
            Ok(())
        }

        fn record_edge(&mut self, run_id: i64, _e: &EdgeRecord) -> StorageResult<()> {
            if self.fail_edges {
                return Err(StorageError::RunNotFound(run_id));
            }
            Ok(())
        }

        fn record_review(&mut self, _run_id: i64, _r: &ReviewRecord) -> StorageResult<()> {
            Ok(())
        }

        fn finish_run(&mut self, _run_id: i64, status: RunStatus) -> StorageResult<()> {
            self.finished.lock().unwrap().push(status);
            Ok(())
        }
    }

    fn session(target: usize) -> CrawlSession {
        let sink = SqliteStorage::new_in_memory().unwrap();
        CrawlSession::open(Box::new(sink), "hash", target).unwrap()
    }

    #[test]
    fn test_enqueue_dedups() {
        let mut session = session(10);

        assert!(session.try_enqueue(&ident("alice")));
        assert!(!session.try_enqueue(&ident("Alice")));
        assert!(session.try_enqueue(&ident("bob")));

        assert_eq!(session.visited_count(), 2);
        assert_eq!(session.frontier_len(), 2);
    }

    #[test]
    fn test_enqueue_respects_budget() {
        let mut session = session(2);

        assert!(session.try_enqueue(&ident("a")));
        assert!(session.try_enqueue(&ident("b")));
        assert!(!session.try_enqueue(&ident("c")));

        assert_eq!(session.visited_count(), 2);
    }

    #[test]
    fn test_fifo_order_and_no_revisit() {
        let mut session = session(10);
        session.try_enqueue(&ident("a"));
        session.try_enqueue(&ident("b"));

        assert_eq!(session.next_node(), Some(ident("a")));
        // Already visited members stay in the visited set
        assert!(!session.try_enqueue(&ident("a")));
        assert_eq!(session.next_node(), Some(ident("b")));
        assert_eq!(session.next_node(), None);
        assert_eq!(session.summary().nodes_visited, 2);
    }

    #[test]
    fn test_emit_counts() {
        let mut session = session(10);

        session
            .emit_profile(&ProfileRecord {
                identity: ident("a"),
                profile_url: "https://letterboxd.com/a/".to_string(),
                followers_count: None,
                following_count: None,
                scraped_at: Utc::now(),
            })
            .unwrap();
        session
            .emit_edge(&EdgeRecord::follows(ident("a"), ident("b")))
            .unwrap();

        let summary = session.close(RunStatus::Completed).unwrap();
        assert_eq!(summary.profiles, 1);
        assert_eq!(summary.edges, 1);
        assert_eq!(summary.reviews, 0);
    }

    #[test]
    fn test_close_marks_status() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            finished: finished.clone(),
            fail_edges: false,
        };

        let session = CrawlSession::open(Box::new(sink), "hash", 5).unwrap();
        assert_eq!(session.run_id(), 7);
        session.close(RunStatus::Completed).unwrap();

        // Closing consumes the session; its drop must not finish the run again
        assert_eq!(*finished.lock().unwrap(), vec![RunStatus::Completed]);
    }

    #[test]
    fn test_unclosed_session_marks_run_failed() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            finished: finished.clone(),
            fail_edges: false,
        };

        let mut session = CrawlSession::open(Box::new(sink), "hash", 5).unwrap();
        session.try_enqueue(&ident("a"));
        drop(session);

        assert_eq!(*finished.lock().unwrap(), vec![RunStatus::Failed]);
    }

    #[tokio::test]
    async fn test_cancelled_task_marks_run_failed() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            finished: finished.clone(),
            fail_edges: false,
        };
        let session = CrawlSession::open(Box::new(sink), "hash", 5).unwrap();

        let handle = tokio::spawn(async move {
            let _session = session;
            std::future::pending::<()>().await;
        });
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        assert_eq!(*finished.lock().unwrap(), vec![RunStatus::Failed]);
    }

    #[test]
    fn test_sink_error_is_not_counted() {
        let sink = RecordingSink {
            fail_edges: true,
            ..RecordingSink::default()
        };
        let mut session = CrawlSession::open(Box::new(sink), "hash", 5).unwrap();

        assert!(session
            .emit_edge(&EdgeRecord::follows(ident("a"), ident("b")))
            .is_err());
        assert_eq!(session.summary().edges, 0);
    }
}
