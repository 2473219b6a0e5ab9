//! Extractors for the origin's member, network and review pages
//!
//! Each extractor is a pure function from an HTML document to records plus a
//! pagination flag. They depend on third-party markup that changes without
//! notice, so the crawler only ever talks to them through this module's
//! exports:
//! - `parse_seed_listing` - popular-members directory pages
//! - `parse_profile` - follower/following counts from a profile header
//! - `parse_network_listing` - followers/following pages
//! - `parse_reviews` - review pages
//!
//! A malformed fragment never aborts a page: it is skipped and the rest of the
//! page is still processed.

mod decode;
mod listing;
mod profile;
mod reviews;

pub use decode::{decode_rating, parse_count, stars_to_float};
pub use listing::{parse_network_listing, parse_seed_listing};
pub use profile::{parse_profile, ProfileStats};
pub use reviews::{parse_reviews, ReviewEntry};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// One extracted page: its items and whether a continuation page exists
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage<T> {
    pub items: T,
    pub has_next: bool,
}

/// Why a fragment of an otherwise usable page was skipped
#[derive(Debug, Error)]
pub(crate) enum FragmentError {
    #[error("no film link in review block")]
    MissingFilmLink,

    #[error("film link has empty title")]
    EmptyTitle,

    #[error("cannot resolve film href '{0}'")]
    BadFilmHref(String),
}

/// Collects an element's text nodes, trimmed and joined with `sep`
pub(crate) fn joined_text(element: &ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Returns true if any anchor's text matches `label`
pub(crate) fn has_link_text(document: &Html, label: &Regex) -> bool {
    let Ok(a_selector) = Selector::parse("a") else {
        return false;
    };

    document
        .select(&a_selector)
        .any(|a| label.is_match(&joined_text(&a, " ")))
}
