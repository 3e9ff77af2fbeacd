//! Askama page templates.

use askama::Template;
use axum::response::Html;
use wikilinks_core::{Article, GraphSummary, RankedArticle};

use crate::ExplorerError;

#[derive(Debug, Template)]
#[template(path = "index.html")]
pub(crate) struct IndexPage {
    pub summary: GraphSummary,
    pub top: Vec<RankedArticle>,
}

#[derive(Debug, Template)]
#[template(path = "article.html")]
pub(crate) struct ArticlePage {
    pub article: Article,
    pub outbound_count: u64,
    pub inbound_count: u64,
    pub outbound: Vec<Article>,
    pub inbound: Vec<Article>,
    pub outbound_truncated: bool,
    pub inbound_truncated: bool,
}

pub(crate) fn render(page: &impl Template) -> Result<Html<String>, ExplorerError> {
    page.render()
        .map(Html)
        .map_err(|source| ExplorerError::Render { source })
}
