//! In-memory dump source for tests and documentation examples.

use std::{
    cell::RefCell,
    future::Future,
    io::{BufRead, Cursor, Write},
};

use async_trait::async_trait;

use super::{BaseUrl, DumpRequest, DumpSource, TransportError};

/// Stub [`DumpSource`] backed by in-memory data.
///
/// The stub remembers which manifests and archives were requested so tests
/// can assert on the URLs the downloader derived.
#[derive(Debug, Clone)]
pub struct StubSource {
    base_url: BaseUrl,
    manifest: Vec<u8>,
    archive: Vec<u8>,
    status_requests: RefCell<Vec<String>>,
    archive_requests: RefCell<Vec<String>>,
}

impl StubSource {
    /// Construct a stub with an explicit base URL, manifest and archive.
    #[must_use]
    pub fn new(base_url: BaseUrl, manifest: Vec<u8>, archive: Vec<u8>) -> Self {
        Self {
            base_url,
            manifest,
            archive,
            status_requests: RefCell::new(Vec::new()),
            archive_requests: RefCell::new(Vec::new()),
        }
    }

    /// Construct a stub rooted at `https://example.org`.
    #[must_use]
    pub fn with_manifest(manifest: Vec<u8>, archive: Vec<u8>) -> Self {
        Self::new(BaseUrl::from("https://example.org"), manifest, archive)
    }

    /// Archive bytes served by the stub.
    #[must_use]
    pub fn archive(&self) -> &[u8] {
        &self.archive
    }

    /// Manifest paths requested so far.
    #[must_use]
    pub fn status_requests(&self) -> Vec<String> {
        self.status_requests.borrow().clone()
    }

    /// Archive URLs requested so far.
    #[must_use]
    pub fn archive_requests(&self) -> Vec<String> {
        self.archive_requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl DumpSource for StubSource {
    fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn fetch_status(
        &self,
        request: &DumpRequest,
    ) -> Result<Box<dyn BufRead + Send>, TransportError> {
        self.status_requests.borrow_mut().push(request.status_path());
        Ok(Box::new(Cursor::new(self.manifest.clone())))
    }

    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        self.archive_requests.borrow_mut().push(url.to_owned());
        sink.write_all(&self.archive)
            .map_err(|source| TransportError::Sink {
                url: url.to_owned(),
                source,
            })?;
        Ok(self.archive.len() as u64)
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// # Panics
/// Panics when the Tokio runtime cannot be created.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("create Tokio runtime for tests")
        .block_on(future)
}
