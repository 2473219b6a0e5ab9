//! Profile header statistics

use super::{decode::parse_count, joined_text};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

static RE_FOLLOWERS: OnceLock<Regex> = OnceLock::new();
static RE_FOLLOWING: OnceLock<Regex> = OnceLock::new();

/// Follower and following counts read from a profile page
///
/// Either count may be absent when the page omits or obscures it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileStats {
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
}

fn label_regex(cell: &'static OnceLock<Regex>, label: &str) -> &'static Regex {
    cell.get_or_init(|| {
        // The number sits directly before its label: "29,927 Followers"
        Regex::new(&format!(r"(?i)(\d[\d,.]*[km]?)\s+{}\b", label)).expect("valid label regex")
    })
}

/// Extracts follower/following counts from a profile page
///
/// Header links render as `<a><span>29,927</span><span>Followers</span></a>`
/// or as plain text; both are matched on the anchor's joined text. A count
/// that cannot be located is reported as absent.
pub fn parse_profile(html: &str) -> ProfileStats {
    let document = Html::parse_document(html);
    let Ok(a_selector) = Selector::parse("a") else {
        return ProfileStats::default();
    };

    let followers = label_regex(&RE_FOLLOWERS, "Followers");
    let following = label_regex(&RE_FOLLOWING, "Following");

    let mut stats = ProfileStats::default();
    for a in document.select(&a_selector) {
        let text = joined_text(&a, " ");

        if stats.followers_count.is_none() {
            stats.followers_count = grab(followers, &text);
        }
        if stats.following_count.is_none() {
            stats.following_count = grab(following, &text);
        }
        if stats.followers_count.is_some() && stats.following_count.is_some() {
            break;
        }
    }

    stats
}

fn grab(label: &Regex, text: &str) -> Option<u64> {
    label
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_count(m.as_str()))
}
