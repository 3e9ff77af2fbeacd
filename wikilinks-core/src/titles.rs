//! Title rules shared by the crawler and the link normaliser.

/// Title prefixes of pages and link targets that never enter the graph.
///
/// Covers project pages, interlanguage/escaped links (leading `:`), media,
/// templates and user pages.
pub const TITLE_PREFIX_BLACKLIST: [&str; 7] = [
    "Wikipedia:",
    "WP:",
    ":",
    "File:",
    "Image:",
    "Template:",
    "User:",
];

/// Marker opening the wikitext of a redirect page.
pub const REDIRECT_MARKER: &str = "#REDIRECT";

/// Report whether `title` starts with a blacklisted prefix.
///
/// # Examples
///
/// ```
/// use wikilinks_core::is_blacklisted_title;
///
/// assert!(is_blacklisted_title("File:Ferris.png"));
/// assert!(!is_blacklisted_title("Ferris wheel"));
/// ```
#[must_use]
pub fn is_blacklisted_title(title: &str) -> bool {
    TITLE_PREFIX_BLACKLIST
        .iter()
        .any(|prefix| title.starts_with(prefix))
}

/// Report whether page text is a redirect stub.
///
/// The marker is matched ASCII case-insensitively after leading whitespace,
/// so both `#REDIRECT [[X]]` and `#redirect[[X]]` qualify.
#[must_use]
pub fn is_redirect_text(text: &str) -> bool {
    let trimmed = text.trim_start().as_bytes();
    trimmed
        .get(..REDIRECT_MARKER.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(REDIRECT_MARKER.as_bytes()))
}

/// Normalise the raw target of a `[[wiki link]]` into an article title.
///
/// Returns `None` for targets that are empty after normalisation (for
/// example pure `#section` links) or that point into a blacklisted
/// namespace.
///
/// # Examples
///
/// ```
/// use wikilinks_core::normalise_link_target;
///
/// assert_eq!(
///     normalise_link_target("graph_theory#History").as_deref(),
///     Some("Graph theory"),
/// );
/// assert_eq!(normalise_link_target("#See also"), None);
/// assert_eq!(normalise_link_target("File:Map.svg"), None);
/// ```
#[must_use]
pub fn normalise_link_target(raw: &str) -> Option<String> {
    // Line breaks and tabs are deleted outright, not treated as spaces.
    let stripped = raw.replace(['\n', '\t'], "");
    let without_fragment = stripped.split('#').next().unwrap_or_default();
    let mut collapsed = String::with_capacity(without_fragment.len());
    let words = without_fragment
        .split(|ch: char| ch == '_' || ch.is_whitespace())
        .filter(|word| !word.is_empty());
    for word in words {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(word);
    }

    let mut chars = collapsed.chars();
    let first = chars.next()?;
    let title: String = first.to_uppercase().chain(chars).collect();
    if is_blacklisted_title(&title) {
        None
    } else {
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("Wikipedia:About")]
    #[case("WP:NPOV")]
    #[case(":Category:Physics")]
    #[case("File:Ferris.png")]
    #[case("Image:Logo.svg")]
    #[case("Template:Infobox")]
    #[case("User:Example")]
    fn blacklists_non_article_namespaces(#[case] title: &str) {
        assert!(is_blacklisted_title(title));
    }

    #[rstest]
    #[case("#REDIRECT [[Target]]", true)]
    #[case("#redirect[[Target]]", true)]
    #[case("  #Redirect [[Target]]", true)]
    #[case("Regular text mentioning #REDIRECT", false)]
    #[case("#RED", false)]
    fn detects_redirect_text(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_redirect_text(text), expected);
    }

    #[rstest]
    #[case("rust", Some("Rust"))]
    #[case("  New_York\tCity \n", Some("New YorkCity"))]
    #[case("New\nYork", Some("NewYork"))]
    #[case("Graph\n theory", Some("Graph theory"))]
    #[case("Paris#History", Some("Paris"))]
    #[case("#Notes", None)]
    #[case("   ", None)]
    #[case("image:Foo.jpg", None)]
    #[case("éclair", Some("Éclair"))]
    fn normalises_link_targets(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalise_link_target(raw).as_deref(), expected);
    }

    proptest! {
        #[test]
        fn normalised_targets_are_trimmed_and_single_spaced(raw in "[ _a-zA-Z\t\n]{0,40}") {
            if let Some(title) = normalise_link_target(&raw) {
                prop_assert_eq!(title.trim(), title.as_str());
                prop_assert!(!title.contains("  "));
                prop_assert!(!title.contains('_'));
                prop_assert!(!title.contains('\t'));
                prop_assert!(!title.contains('\n'));
            }
        }
    }
}
