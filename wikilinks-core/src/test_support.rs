//! In-memory `LinkGraph` and fixture writers used by unit and behaviour tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    Article, ArticleId, ArticleMap, GraphSummary, LinkDirection, LinkGraph, LinkGraphError,
    RankedArticle,
};

/// `LinkGraph` over an [`ArticleMap`] snapshot.
///
/// Lookups scan the whole map and are intended only for small datasets.
#[derive(Debug, Default, Clone)]
pub struct MemoryLinkGraph {
    names: BTreeMap<ArticleId, String>,
    outbound: BTreeMap<ArticleId, BTreeSet<ArticleId>>,
    inbound: BTreeMap<ArticleId, BTreeSet<ArticleId>>,
}

impl MemoryLinkGraph {
    /// Snapshot the articles and links of `map`.
    #[must_use]
    pub fn from_map(map: &ArticleMap) -> Self {
        let mut graph = Self {
            names: map
                .articles()
                .map(|(name, id)| (id, name.to_owned()))
                .collect(),
            ..Self::default()
        };
        for (source, target) in map.links() {
            graph.outbound.entry(source).or_default().insert(target);
            graph.inbound.entry(target).or_default().insert(source);
        }
        graph
    }

    fn side(&self, direction: LinkDirection) -> &BTreeMap<ArticleId, BTreeSet<ArticleId>> {
        match direction {
            LinkDirection::Outbound => &self.outbound,
            LinkDirection::Inbound => &self.inbound,
        }
    }

    fn resolve(&self, id: ArticleId) -> Option<Article> {
        self.names.get(&id).map(|name| Article {
            id,
            name: name.clone(),
        })
    }
}

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

impl LinkGraph for MemoryLinkGraph {
    fn article(&self, id: ArticleId) -> Result<Option<Article>, LinkGraphError> {
        Ok(self.resolve(id))
    }

    fn link_count(&self, id: ArticleId, direction: LinkDirection) -> Result<u64, LinkGraphError> {
        Ok(self
            .side(direction)
            .get(&id)
            .map_or(0, |neighbours| len_u64(neighbours.len())))
    }

    fn links(
        &self,
        id: ArticleId,
        direction: LinkDirection,
        limit: usize,
    ) -> Result<Vec<Article>, LinkGraphError> {
        let mut neighbours: Vec<Article> = self
            .side(direction)
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|neighbour| self.resolve(*neighbour))
            .collect();
        neighbours.sort_by(|left, right| left.name.cmp(&right.name));
        neighbours.truncate(limit);
        Ok(neighbours)
    }

    fn summary(&self) -> Result<GraphSummary, LinkGraphError> {
        let links = self.outbound.values().map(BTreeSet::len).sum();
        Ok(GraphSummary {
            articles: len_u64(self.names.len()),
            links: len_u64(links),
        })
    }

    fn most_linked(&self, limit: usize) -> Result<Vec<RankedArticle>, LinkGraphError> {
        let mut ranked: Vec<RankedArticle> = self
            .inbound
            .iter()
            .filter_map(|(id, sources)| {
                self.resolve(*id).map(|article| RankedArticle {
                    article,
                    inbound: len_u64(sources.len()),
                })
            })
            .collect();
        ranked.sort_by(|left, right| {
            right
                .inbound
                .cmp(&left.inbound)
                .then_with(|| left.article.name.cmp(&right.article.name))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}

/// Persist `map` into a fresh SQLite link graph at `path`.
///
/// Uses a single transaction and no batching; production loads go through
/// the bulk inserter in `wikilinks-data`.
#[cfg(feature = "store-sqlite")]
pub fn write_link_graph(path: &std::path::Path, map: &ArticleMap) -> rusqlite::Result<()> {
    use crate::graph::schema::initialise_graph_schema;

    let mut connection = rusqlite::Connection::open(path)?;
    initialise_graph_schema(&mut connection)
        .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
    let transaction = connection.transaction()?;
    {
        let mut insert_article =
            transaction.prepare_cached("INSERT OR IGNORE INTO articles (id, name) VALUES (?1, ?2)")?;
        for (name, id) in map.articles() {
            insert_article.execute((id.as_bytes().as_slice(), name))?;
        }
        let mut insert_link = transaction
            .prepare_cached("INSERT OR IGNORE INTO links (source, target) VALUES (?1, ?2)")?;
        for (source, target) in map.links() {
            insert_link.execute((source.as_bytes().as_slice(), target.as_bytes().as_slice()))?;
        }
    }
    transaction.commit()
}
