/// Per-node crawl states
///
/// A dequeued member walks these states in order, running one task group in
/// each active state. A failed task still advances the node.
use std::fmt;

/// Where a visited node is in its walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Profile page not yet fetched
    PendingProfile,

    /// Review pages not yet walked
    PendingReviews,

    /// Outgoing "following" listing not yet walked
    PendingFollowingEdges,

    /// Incoming "followers" listing not yet walked
    PendingFollowerEdges,

    /// All task groups have run; the node is never revisited
    Done,
}

/// The task group run while a node sits in an active state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTask {
    Profile,
    Reviews,
    FollowingEdges,
    FollowerEdges,
}

impl NodeState {
    /// Returns the state a freshly dequeued node starts in
    pub fn initial() -> Self {
        Self::PendingProfile
    }

    /// Returns true once every task group has run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the task to run in this state, or None when done
    pub fn task(&self) -> Option<NodeTask> {
        match self {
            Self::PendingProfile => Some(NodeTask::Profile),
            Self::PendingReviews => Some(NodeTask::Reviews),
            Self::PendingFollowingEdges => Some(NodeTask::FollowingEdges),
            Self::PendingFollowerEdges => Some(NodeTask::FollowerEdges),
            Self::Done => None,
        }
    }

    /// Returns the following state, whatever the outcome of this state's task
    pub fn next(&self) -> Self {
        match self {
            Self::PendingProfile => Self::PendingReviews,
            Self::PendingReviews => Self::PendingFollowingEdges,
            Self::PendingFollowingEdges => Self::PendingFollowerEdges,
            Self::PendingFollowerEdges | Self::Done => Self::Done,
        }
    }
}

impl NodeTask {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Reviews => "reviews",
            Self::FollowingEdges => "following",
            Self::FollowerEdges => "followers",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PendingProfile => "pending-profile",
            Self::PendingReviews => "pending-reviews",
            Self::PendingFollowingEdges => "pending-following-edges",
            Self::PendingFollowerEdges => "pending-follower-edges",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

impl fmt::Display for NodeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_order() {
        let mut state = NodeState::initial();
        let mut tasks = Vec::new();

        while let Some(task) = state.task() {
            tasks.push(task);
            state = state.next();
        }

        assert_eq!(
            tasks,
            vec![
                NodeTask::Profile,
                NodeTask::Reviews,
                NodeTask::FollowingEdges,
                NodeTask::FollowerEdges,
            ]
        );
        assert!(state.is_terminal());
    }

    #[test]
    fn test_done_is_absorbing() {
        assert_eq!(NodeState::Done.next(), NodeState::Done);
        assert_eq!(NodeState::Done.task(), None);
    }

    #[test]
    fn test_only_done_is_terminal() {
        assert!(!NodeState::PendingProfile.is_terminal());
        assert!(!NodeState::PendingFollowerEdges.is_terminal());
        assert!(NodeState::Done.is_terminal());
    }

    #[test]
    fn test_task_names() {
        assert_eq!(NodeTask::Profile.to_string(), "profile");
        assert_eq!(NodeTask::FollowerEdges.name(), "followers");
        assert_eq!(NodeState::PendingReviews.to_string(), "pending-reviews");
    }
}
