//! Wiki link extraction.

use std::sync::LazyLock;

use regex::Regex;
use wikilinks_core::normalise_link_target;

/// Matches `[[Target]]` and `[[Target|label]]`, capturing the target.
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|]+)(?:\|[^\[\]]*)?\]\]").expect("link pattern is a valid regex")
});

/// Extract the normalised link targets of a page's wikitext.
///
/// Targets that normalise to nothing, such as section anchors or file
/// embeds, are dropped. Duplicates are preserved.
///
/// # Examples
/// ```
/// use wikilinks_data::wikipedia::crawl::extract_links;
///
/// let text = "[[graph theory]] and [[Leonhard_Euler|Euler]] on [[File:Map.svg]]";
/// let links: Vec<_> = extract_links(text).collect();
/// assert_eq!(links, ["Graph theory", "Leonhard Euler"]);
/// ```
pub fn extract_links(text: &str) -> impl Iterator<Item = String> + '_ {
    LINK_PATTERN
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .filter_map(|target| normalise_link_target(target.as_str()))
}
