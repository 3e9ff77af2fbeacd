//! Router and request handlers.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wikilinks_core::{Article, LinkDirection, LinkGraph, normalise_link_target};

use crate::{
    ExplorerError,
    pages::{ArticlePage, IndexPage, render},
};

/// Maximum number of links listed per direction on an article page.
pub const EDGE_LIMIT: usize = 1_000;

/// Number of most-linked articles shown on the index page.
pub const INDEX_TOP: usize = 25;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    graph: Arc<dyn LinkGraph + Send + Sync>,
}

impl AppState {
    /// Serve queries from `graph`.
    pub fn new(graph: Arc<dyn LinkGraph + Send + Sync>) -> Self {
        Self { graph }
    }

    /// Run `query` against the graph on the blocking thread pool.
    async fn query<T, F>(&self, query: F) -> Result<T, ExplorerError>
    where
        F: FnOnce(&dyn LinkGraph) -> Result<T, ExplorerError> + Send + 'static,
        T: Send + 'static,
    {
        let graph = Arc::clone(&self.graph);
        tokio::task::spawn_blocking(move || query(graph.as_ref()))
            .await
            .map_err(|source| ExplorerError::Join { source })?
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Build the explorer router.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use wikilinks_core::{ArticleMap, test_support::MemoryLinkGraph};
/// use wikilinks_explorer::{AppState, router};
///
/// let graph = MemoryLinkGraph::from_map(&ArticleMap::default());
/// let app = router(AppState::new(Arc::new(graph)));
/// # let _ = app;
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/article", get(article))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ExplorerError> {
    let page = state
        .query(|graph| {
            Ok(IndexPage {
                summary: graph.summary()?,
                top: graph.most_linked(INDEX_TOP)?,
            })
        })
        .await?;
    render(&page)
}

#[derive(Debug, Deserialize)]
struct ArticleQuery {
    #[serde(default)]
    name: Option<String>,
}

async fn article(
    State(state): State<AppState>,
    Query(params): Query<ArticleQuery>,
) -> Result<Html<String>, ExplorerError> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(ExplorerError::MissingName)?
        .to_owned();
    tracing::debug!(%name, "rendering article");
    let page = state.query(move |graph| article_page(graph, &name)).await?;
    render(&page)
}

/// Resolve `name` exactly, falling back to its normalised link form.
fn find_article(graph: &dyn LinkGraph, name: &str) -> Result<Option<Article>, ExplorerError> {
    if let Some(found) = graph.article_by_name(name)? {
        return Ok(Some(found));
    }
    match normalise_link_target(name) {
        Some(normalised) if normalised != name => Ok(graph.article_by_name(&normalised)?),
        _ => Ok(None),
    }
}

fn article_page(graph: &dyn LinkGraph, name: &str) -> Result<ArticlePage, ExplorerError> {
    let article = find_article(graph, name)?.ok_or_else(|| ExplorerError::NotFound {
        name: name.to_owned(),
    })?;
    let outbound_count = graph.link_count(article.id, LinkDirection::Outbound)?;
    let inbound_count = graph.link_count(article.id, LinkDirection::Inbound)?;
    let outbound = graph.links(article.id, LinkDirection::Outbound, EDGE_LIMIT)?;
    let inbound = graph.links(article.id, LinkDirection::Inbound, EDGE_LIMIT)?;
    Ok(ArticlePage {
        outbound_truncated: outbound_count > outbound.len() as u64,
        inbound_truncated: inbound_count > inbound.len() as u64,
        article,
        outbound_count,
        inbound_count,
        outbound,
        inbound,
    })
}
