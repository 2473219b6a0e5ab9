//! Member identities and the crawl-wide visited set
//!
//! An [`Identity`] is the normalized username that keys every dedup and
//! queueing decision. The [`VisitedSet`] records every identity ever accepted
//! into the frontier and only grows during a run.

mod normalize;

pub use normalize::{is_profile_href, normalize_identity};

use std::collections::HashSet;
use std::fmt;

/// Normalized username of a member account
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Returns the username as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identity, returning the username
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Set of identities already accepted into the frontier
///
/// Membership is tested and recorded in a single call, so no caller can
/// observe "absent" and then race another caller into inserting the same
/// identity.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<Identity>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `identity` unless it is already present or `limit` is reached
    ///
    /// Returns true when the identity was newly recorded.
    pub fn insert_within(&mut self, identity: &Identity, limit: usize) -> bool {
        if self.seen.len() >= limit || self.seen.contains(identity) {
            return false;
        }
        self.seen.insert(identity.clone())
    }

    /// Returns true if the identity has been accepted before
    pub fn contains(&self, identity: &Identity) -> bool {
        self.seen.contains(identity)
    }

    /// Number of identities ever accepted
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if nothing has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
