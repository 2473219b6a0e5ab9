use super::Identity;
use percent_encoding::percent_decode_str;
use url::Url;

/// Placeholder origin used to resolve bare paths such as `/name/`
const RELATIVE_BASE: &str = "https://origin.invalid/";

/// Derives the account identity from a profile URL or path
///
/// # Normalization Steps
///
/// 1. Parse the input as an absolute URL, or resolve it as a path
/// 2. Ignore scheme, host, query and fragment
/// 3. Take the first non-empty path segment
/// 4. Lowercase it (usernames are case-insensitive on the origin)
///
/// Returns `None` when the input has no usable first segment.
///
/// # Examples
///
/// ```
/// use reelgraph::identity::normalize_identity;
///
/// let a = normalize_identity("https://letterboxd.com/Filipe_Furtado/").unwrap();
/// let b = normalize_identity("http://letterboxd.com/filipe_furtado").unwrap();
/// let c = normalize_identity("/filipe_furtado/films/").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b, c);
/// assert_eq!(a.as_str(), "filipe_furtado");
/// ```
pub fn normalize_identity(input: &str) -> Option<Identity> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).ok()?.join(input).ok()?
        }
        Err(_) => return None,
    };

    let segment = url.path_segments()?.find(|s| !s.is_empty())?;
    // Malformed escapes are kept as written
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let name = decoded.trim().to_lowercase();

    if name.is_empty() {
        None
    } else {
        Some(Identity(name))
    }
}

/// Returns true for hrefs shaped like a member profile link: `/name/`
///
/// Listing pages link to films, lists and pagination as well; only single
/// segment paths with a trailing slash point at a member.
pub fn is_profile_href(href: &str) -> bool {
    href.starts_with('/') && href.ends_with('/') && href.matches('/').count() == 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Option<String> {
        normalize_identity(s).map(|i| i.into_string())
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(id("https://letterboxd.com/davidehrlich/"), Some("davidehrlich".to_string()));
    }

    #[test]
    fn test_trailing_slash_and_scheme_are_irrelevant() {
        let variants = [
            "https://letterboxd.com/kurstboy/",
            "https://letterboxd.com/kurstboy",
            "http://letterboxd.com/kurstboy/",
            "http://letterboxd.com/kurstboy",
        ];
        for variant in variants {
            assert_eq!(id(variant), Some("kurstboy".to_string()), "variant {}", variant);
        }
    }

    #[test]
    fn test_case_folds() {
        assert_eq!(id("/SilentDawn/"), id("/silentdawn/"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(id("/filipe_furtado/"), Some("filipe_furtado".to_string()));
        assert_eq!(id("filipe_furtado/followers/page/2/"), Some("filipe_furtado".to_string()));
    }

    #[test]
    fn test_deeper_paths_use_first_segment() {
        assert_eq!(
            id("https://letterboxd.com/jay/film/heat/"),
            Some("jay".to_string())
        );
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(id("/jay/?ref=nav#top"), Some("jay".to_string()));
    }

    #[test]
    fn test_percent_encoded_segment() {
        assert_eq!(id("/caf%C3%A9/"), Some("café".to_string()));
        assert_eq!(id("/bad%zzname/"), Some("bad%zzname".to_string()));
        assert_eq!(id("/trail%/"), Some("trail%".to_string()));
        assert_eq!(id("/two%20words/"), Some("two words".to_string()));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(id(""), None);
        assert_eq!(id("/"), None);
        assert_eq!(id("https://letterboxd.com/"), None);
        assert_eq!(id("   "), None);
    }

    #[test]
    fn test_is_profile_href() {
        assert!(is_profile_href("/jay/"));
        assert!(!is_profile_href("/jay"));
        assert!(!is_profile_href("/film/heat/"));
        assert!(!is_profile_href("/members/popular/page/2/"));
        assert!(!is_profile_href("https://letterboxd.com/jay/"));
        assert!(!is_profile_href("/"));
    }
}
