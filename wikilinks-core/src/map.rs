//! In-memory article/link map produced by the crawler.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::ArticleId;

/// Every article name seen in a dump together with the outbound links of
/// each crawled page.
///
/// Link endpoints are always registered through [`ArticleMap::insert_article`]
/// first, so every id referenced by `links` resolves to a name.
///
/// # Examples
///
/// ```
/// use wikilinks_core::ArticleMap;
///
/// let mut map = ArticleMap::default();
/// let rust = map.insert_article("Rust");
/// let cargo = map.insert_article("Cargo");
/// map.insert_link(rust, cargo);
/// map.insert_link(rust, cargo);
///
/// assert_eq!(map.article_len(), 2);
/// assert_eq!(map.link_len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArticleMap {
    names: BTreeMap<String, ArticleId>,
    links: BTreeMap<ArticleId, BTreeSet<ArticleId>>,
}

impl ArticleMap {
    /// Register an article by name and return its id.
    ///
    /// Registering the same name twice returns the id assigned the first time.
    pub fn insert_article(&mut self, name: &str) -> ArticleId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = ArticleId::from_name(name);
        self.names.insert(name.to_owned(), id);
        id
    }

    /// Record a directed link. Duplicate links are ignored.
    pub fn insert_link(&mut self, source: ArticleId, target: ArticleId) {
        self.links.entry(source).or_default().insert(target);
    }

    /// Number of distinct article names.
    #[must_use]
    pub fn article_len(&self) -> u64 {
        u64::try_from(self.names.len()).unwrap_or(u64::MAX)
    }

    /// Number of distinct `(source, target)` pairs.
    #[must_use]
    pub fn link_len(&self) -> u64 {
        let total: usize = self.links.values().map(BTreeSet::len).sum();
        u64::try_from(total).unwrap_or(u64::MAX)
    }

    /// Look up the id registered for `name`.
    #[must_use]
    pub fn article_id(&self, name: &str) -> Option<ArticleId> {
        self.names.get(name).copied()
    }

    /// Iterate `(name, id)` pairs in name order.
    pub fn articles(&self) -> impl Iterator<Item = (&str, ArticleId)> + '_ {
        self.names.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Iterate every `(source, target)` link in id order.
    pub fn links(&self) -> impl Iterator<Item = (ArticleId, ArticleId)> + '_ {
        self.links
            .iter()
            .flat_map(|(source, targets)| targets.iter().map(move |target| (*source, *target)))
    }

    /// Outbound targets of `source`; empty when the article links nowhere.
    pub fn outbound(&self, source: ArticleId) -> impl Iterator<Item = ArticleId> + '_ {
        self.links.get(&source).into_iter().flatten().copied()
    }

    /// Build a reverse index from id to name.
    #[must_use]
    pub fn name_index(&self) -> HashMap<ArticleId, &str> {
        self.names
            .iter()
            .map(|(name, id)| (*id, name.as_str()))
            .collect()
    }

    /// Whether no article has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn triangle() -> ArticleMap {
        let mut map = ArticleMap::default();
        let a = map.insert_article("Alpha");
        let b = map.insert_article("Beta");
        let c = map.insert_article("Gamma");
        map.insert_link(a, b);
        map.insert_link(b, c);
        map.insert_link(c, a);
        map.insert_link(a, c);
        map
    }

    #[rstest]
    fn insert_article_is_idempotent() {
        let mut map = ArticleMap::default();
        let first = map.insert_article("Rust");
        let second = map.insert_article("Rust");
        assert_eq!(first, second);
        assert_eq!(map.article_len(), 1);
    }

    #[rstest]
    fn counts_distinct_links(triangle: ArticleMap) {
        assert_eq!(triangle.article_len(), 3);
        assert_eq!(triangle.link_len(), 4);
        assert_eq!(triangle.links().count(), 4);
    }

    #[rstest]
    fn articles_iterate_in_name_order(triangle: ArticleMap) {
        let names: Vec<_> = triangle.articles().map(|(name, _)| name).collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
    }

    #[rstest]
    fn outbound_lists_targets(triangle: ArticleMap) {
        let alpha = ArticleId::from_name("Alpha");
        let index = triangle.name_index();
        let mut targets: Vec<_> = triangle
            .outbound(alpha)
            .filter_map(|id| index.get(&id).copied())
            .collect();
        targets.sort_unstable();
        assert_eq!(targets, ["Beta", "Gamma"]);
    }

    #[rstest]
    fn outbound_of_unknown_article_is_empty(triangle: ArticleMap) {
        assert_eq!(triangle.outbound(ArticleId::from_name("Delta")).count(), 0);
    }

    #[rstest]
    fn every_link_endpoint_resolves_to_a_name(triangle: ArticleMap) {
        let index = triangle.name_index();
        for (source, target) in triangle.links() {
            assert!(index.contains_key(&source));
            assert!(index.contains_key(&target));
        }
    }
}
