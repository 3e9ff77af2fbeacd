//! Wikipedia dump ingestion.

pub mod crawl;
pub mod dump;
pub mod export;
pub mod insert;
