//! Discovering and downloading Wikipedia `pages-articles` dumps.
//!
//! [`download_dump`] resolves a [`DumpRequest`] to a concrete archive and
//! streams it to disk through a [`DumpSource`]. Completed downloads may be
//! recorded in a [`DownloadLog`].
#![forbid(unsafe_code)]

mod error;
mod log;
mod ops;
mod source;
mod types;
mod util;

#[cfg(any(test, feature = "test-support"))]
mod test_support;
#[cfg(any(test, feature = "test-support"))]
pub use test_support::{StubSource, block_on_for_tests};

pub use error::{TransportError, WikipediaDumpError};
pub use log::DownloadLog;
pub use ops::{download_descriptor, download_dump, resolve_descriptor};
pub use source::{DEFAULT_USER_AGENT, DumpSource, HttpDumpSource};
pub use types::{
    BaseUrl, DEFAULT_WIKI, DownloadOptions, DownloadReport, DumpDescriptor, DumpFileName,
    DumpRequest, DumpUrl, LATEST_DUMP_DATE,
};
pub use util::DEFAULT_BASE_URL;
