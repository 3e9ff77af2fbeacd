//! Data pipeline for the Wikipedia link graph.
//!
//! The [`wikipedia`] module covers each stage: downloading a dump, crawling
//! it into an article map, loading the map into SQLite and exporting it as
//! text. [`store_url`] parses the database locations the pipeline writes to.

pub mod store_url;
pub mod wikipedia;

pub use store_url::{DatabaseUrl, DatabaseUrlError};
