//! Review pages

use super::{decode::decode_rating, has_link_text, joined_text, FragmentError, ListingPage};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

static RE_RATING_LINE: OnceLock<Regex> = OnceLock::new();
static RE_BODY_CLASS: OnceLock<Regex> = OnceLock::new();
static RE_CONTINUE: OnceLock<Regex> = OnceLock::new();

fn re_rating_line() -> &'static Regex {
    RE_RATING_LINE.get_or_init(|| {
        Regex::new(r"([★½]+)\s+(?:Watched|Rewatched)\s+([0-9A-Za-z ,]+)")
            .expect("valid rating regex")
    })
}

fn re_body_class() -> &'static Regex {
    RE_BODY_CLASS
        .get_or_init(|| Regex::new(r"(?i)review|body|truncate").expect("valid body class regex"))
}

fn re_continue() -> &'static Regex {
    RE_CONTINUE.get_or_init(|| Regex::new(r"\b(?:Older|Next)\b").expect("valid pagination regex"))
}

/// A review as it appears on the page, before it is tagged with its author
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEntry {
    pub film_title: String,
    pub film_url: String,
    /// 0-5 in half steps; absent when the review carries no star glyph
    pub rating: Option<f64>,
    /// Raw glyph string, empty when unrated
    pub rating_stars: String,
    /// Free text following "Watched"/"Rewatched", not parsed as a date
    pub watched_date: Option<String>,
    pub review_text: String,
}

/// Extracts review entries from a member's review page
///
/// # Extraction Rules
///
/// - Blocks are `.film-detail` list entries, then `section` elements that do
///   not wrap one of those
/// - The first link containing `/film/` gives the title and film URL
/// - A glyph run followed by "Watched"/"Rewatched" gives rating and date
/// - The body is the first `div` whose class mentions review, body or
///   truncate, inside or after the block
/// - Lowest-priority fallback: the text after the last "Watched" in the block.
///   This is a best-effort heuristic and may pick up unrelated text.
///
/// A block that cannot be parsed is skipped. The page continues when it has an
/// "Older" or "Next" link.
///
/// # Arguments
///
/// * `html` - The review page HTML
/// * `base_url` - Origin used to resolve relative film links
pub fn parse_reviews(html: &str, base_url: &Url) -> ListingPage<Vec<ReviewEntry>> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for block in review_blocks(&document) {
        match parse_block(&block, base_url) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::trace!("Skipping review fragment: {}", e),
        }
    }

    ListingPage {
        items: entries,
        has_next: has_link_text(&document, re_continue()),
    }
}

fn review_blocks(document: &Html) -> Vec<ElementRef<'_>> {
    let mut blocks = Vec::new();
    let mut taken = HashSet::new();

    if let Ok(detail_selector) = Selector::parse("li.film-detail, li .film-detail") {
        for block in document.select(&detail_selector) {
            // A detail nested in an already-taken detail is the same review
            let nested = block.ancestors().any(|a| taken.contains(&a.id()));
            if !nested && taken.insert(block.id()) {
                blocks.push(block);
            }
        }
    }

    if let (Ok(section_selector), Ok(detail_selector)) =
        (Selector::parse("section"), Selector::parse(".film-detail"))
    {
        for section in document.select(&section_selector) {
            let wraps_detail = section.select(&detail_selector).any(|inner| {
                taken.contains(&inner.id()) || inner.ancestors().any(|a| taken.contains(&a.id()))
            });
            if !wraps_detail && taken.insert(section.id()) {
                blocks.push(section);
            }
        }
    }

    blocks
}

fn parse_block(block: &ElementRef<'_>, base_url: &Url) -> Result<ReviewEntry, FragmentError> {
    let film_link = block
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "a"
                && el
                    .value()
                    .attr("href")
                    .is_some_and(|href| href.contains("/film/"))
        })
        .ok_or(FragmentError::MissingFilmLink)?;

    let film_title = joined_text(&film_link, " ");
    if film_title.is_empty() {
        return Err(FragmentError::EmptyTitle);
    }

    let href = film_link.value().attr("href").unwrap_or_default();
    let film_url = base_url
        .join(href)
        .map_err(|_| FragmentError::BadFilmHref(href.to_string()))?
        .to_string();

    let text = joined_text(block, "\n");
    let (rating_stars, watched_date) = match re_rating_line().captures(&text) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
            caps.get(2).map(|m| m.as_str().trim().to_string()),
        ),
        None => (String::new(), None),
    };

    let review_text = find_body(block).unwrap_or_else(|| watched_fallback(&text));

    Ok(ReviewEntry {
        film_title,
        film_url,
        rating: decode_rating(&rating_stars),
        rating_stars,
        watched_date,
        review_text,
    })
}

/// Looks for a body `div` inside the block, then in the elements following it
fn find_body(block: &ElementRef<'_>) -> Option<String> {
    let inside = block.descendants().skip(1);
    let after = block.next_siblings().flat_map(|sibling| sibling.descendants());

    inside
        .chain(after)
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "div" && el.value().classes().any(|c| re_body_class().is_match(c))
        })
        .map(|el| joined_text(&el, " "))
        .filter(|body| !body.is_empty())
}

fn watched_fallback(text: &str) -> String {
    let mut parts = text.rsplit("Watched");
    match (parts.next(), parts.next()) {
        (Some(last), Some(_)) => last.trim().to_string(),
        _ => String::new(),
    }
}
