//! Member listing pages: the popular-members directory and network pages

use super::{has_link_text, ListingPage};
use crate::identity::{is_profile_href, normalize_identity, Identity};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

static RE_NEXT: OnceLock<Regex> = OnceLock::new();

fn re_next() -> &'static Regex {
    RE_NEXT.get_or_init(|| Regex::new(r"\bNext\b").expect("valid next regex"))
}

/// Extracts candidate identities from a popular-members directory page
///
/// Member names are links inside `h3` headings whose href has the `/name/`
/// shape. The page continues when it carries a "Next" link.
pub fn parse_seed_listing(html: &str) -> ListingPage<BTreeSet<Identity>> {
    let document = Html::parse_document(html);
    let mut members = BTreeSet::new();

    if let Ok(selector) = Selector::parse("h3 a[href^='/']") {
        for a in document.select(&selector) {
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            if !is_profile_href(href) {
                continue;
            }
            if let Some(identity) = normalize_identity(href) {
                members.insert(identity);
            }
        }
    }

    ListingPage {
        items: members,
        has_next: has_link_text(&document, re_next()),
    }
}

/// Extracts peer identities from a followers or following page
///
/// Each peer is the first link of an `h3` heading. Page order is preserved and
/// a peer listed twice on the same page is reported once.
pub fn parse_network_listing(html: &str) -> ListingPage<Vec<Identity>> {
    let document = Html::parse_document(html);
    let mut peers = Vec::new();
    let mut seen = HashSet::new();

    if let (Ok(h3_selector), Ok(a_selector)) = (Selector::parse("h3"), Selector::parse("a[href]")) {
        for heading in document.select(&h3_selector) {
            let Some(a) = heading.select(&a_selector).next() else {
                continue;
            };
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            if !is_profile_href(href) {
                tracing::trace!("Skipping non-member heading link {}", href);
                continue;
            }
            if let Some(identity) = normalize_identity(href) {
                if seen.insert(identity.clone()) {
                    peers.push(identity);
                }
            }
        }
    }

    ListingPage {
        items: peers,
        has_next: has_link_text(&document, re_next()),
    }
}
