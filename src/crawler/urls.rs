//! URL layout of the origin site

use crate::identity::Identity;
use crate::storage::EdgeRecord;
use url::Url;

/// Which side of a member's network a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    /// Members the node follows
    Following,
    /// Members following the node
    Followers,
}

impl EdgeDirection {
    /// Path segment of the listing
    pub fn path(&self) -> &'static str {
        match self {
            Self::Following => "following",
            Self::Followers => "followers",
        }
    }

    /// Edge recorded when `peer` is listed on `node`'s page
    ///
    /// On a following page `node` follows `peer`; on a followers page `peer`
    /// follows `node`.
    pub fn edge_for(&self, node: &Identity, peer: &Identity) -> EdgeRecord {
        match self {
            Self::Following => EdgeRecord::follows(node.clone(), peer.clone()),
            Self::Followers => EdgeRecord::follows(peer.clone(), node.clone()),
        }
    }
}

/// Builds page URLs relative to the configured origin
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Popular-members directory, page `page` (1-based)
    pub fn popular_members(&self, page: u32) -> Result<Url, url::ParseError> {
        self.base
            .join(&format!("members/popular/{}", page_suffix(page)))
    }

    pub fn profile(&self, identity: &Identity) -> Result<Url, url::ParseError> {
        self.base.join(&format!("{}/", identity))
    }

    pub fn reviews(&self, identity: &Identity, page: u32) -> Result<Url, url::ParseError> {
        self.base
            .join(&format!("{}/reviews/{}", identity, page_suffix(page)))
    }

    pub fn network(
        &self,
        identity: &Identity,
        direction: EdgeDirection,
        page: u32,
    ) -> Result<Url, url::ParseError> {
        self.base.join(&format!(
            "{}/{}/{}",
            identity,
            direction.path(),
            page_suffix(page)
        ))
    }
}

fn page_suffix(page: u32) -> String {
    if page <= 1 {
        String::new()
    } else {
        format!("page/{}/", page)
    }
}
