//! Web explorer for the Wikipedia link graph.
//!
//! Serves an index page with the most linked articles and one page per
//! article listing its outbound and inbound links. Pages are rendered with
//! Askama; graph queries run on Tokio's blocking pool so a slow SQLite read
//! never stalls the reactor.

mod error;
mod pages;
mod routes;
mod server;

pub use error::ExplorerError;
pub use routes::{AppState, EDGE_LIMIT, INDEX_TOP, router};
pub use server::serve;
