//! Decoders for the abbreviated numbers and star glyphs the origin renders

use regex::Regex;
use std::sync::OnceLock;

static RE_COUNT: OnceLock<Regex> = OnceLock::new();

const FULL_STAR: char = '★';
const HALF_STAR: char = '½';

fn re_count() -> &'static Regex {
    RE_COUNT.get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)?)([km]?)").expect("valid count regex"))
}

/// Decodes a rendered count such as `29,927`, `12.3k` or `1.2m`
///
/// Thousands separators are dropped and `k`/`m` suffixes scale the leading
/// decimal. Returns `None` when the text does not start with a number.
///
/// # Examples
///
/// ```
/// use reelgraph::extract::parse_count;
///
/// assert_eq!(parse_count("29,927"), Some(29927));
/// assert_eq!(parse_count("12.3k"), Some(12300));
/// assert_eq!(parse_count(""), None);
/// ```
pub fn parse_count(text: &str) -> Option<u64> {
    let cleaned = text.trim().to_lowercase().replace(',', "");
    let caps = re_count().captures(&cleaned)?;

    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str()) {
        Some("k") => 1_000.0,
        Some("m") => 1_000_000.0,
        _ => 1.0,
    };

    // Round rather than truncate: 0.29 * 1000 is 289.99999999999994
    let scaled = (value * scale).round();

    // Counts are stored as SQLite integers; anything past i64 is not a count
    if !scaled.is_finite() || scaled >= i64::MAX as f64 {
        return None;
    }
    Some(scaled as u64)
}

/// Converts a star glyph string into a rating: one per `★`, plus 0.5 for `½`
///
/// An empty string decodes to 0.0. Callers that have no glyph at all should
/// record an absent rating instead of calling this.
pub fn stars_to_float(stars: &str) -> f64 {
    let full = stars.chars().filter(|c| *c == FULL_STAR).count() as f64;
    let half = if stars.contains(HALF_STAR) { 0.5 } else { 0.0 };
    full + half
}

/// Decodes an optional glyph string, keeping "no glyph" distinct from zero
pub fn decode_rating(stars: &str) -> Option<f64> {
    if stars.is_empty() {
        None
    } else {
        Some(stars_to_float(stars))
    }
}
