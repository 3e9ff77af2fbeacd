use std::{
    io::{self, BufRead, Cursor, Write},
    time::Duration,
};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, header::USER_AGENT};

use super::util::sanitise_base_url;
use super::{BaseUrl, DumpRequest, DumpUrl, TransportError};

/// User agent sent with every dump request.
pub const DEFAULT_USER_AGENT: &str = "wikilinks-fetch/0.1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_TIMEOUT: Duration = Duration::from_secs(15);

/// Access to a dump mirror.
#[async_trait(?Send)]
pub trait DumpSource {
    /// Base URL of the dump mirror.
    fn base_url(&self) -> &BaseUrl;
    /// Fetch the status manifest of the dump run named by `request`.
    async fn fetch_status(
        &self,
        request: &DumpRequest,
    ) -> Result<Box<dyn BufRead + Send>, TransportError>;
    /// Stream the archive at `url` into `sink`, returning the byte count.
    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError>;
}

/// HTTP implementation of [`DumpSource`].
#[derive(Debug)]
pub struct HttpDumpSource {
    client: Client,
    base_url: BaseUrl,
    user_agent: String,
}

impl HttpDumpSource {
    /// Construct an HTTP-backed dump source.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("client builder only fails with invalid configuration");
        Self {
            client,
            base_url: sanitise_base_url(base_url),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Override the default user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn status_url(&self, request: &DumpRequest) -> DumpUrl {
        DumpUrl::new(format!("{}{}", self.base_url, request.status_path()))
    }

    async fn call(&self, url: &str, timeout: Option<Duration>) -> Result<Response, TransportError> {
        let mut builder = self.client.get(url).header(USER_AGENT, self.user_agent.as_str());
        if let Some(limit) = timeout {
            builder = builder.timeout(limit);
        }
        builder
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, url))
    }
}

#[async_trait(?Send)]
impl DumpSource for HttpDumpSource {
    fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn fetch_status(
        &self,
        request: &DumpRequest,
    ) -> Result<Box<dyn BufRead + Send>, TransportError> {
        let url = self.status_url(request);
        let body = self
            .call(&url, Some(STATUS_TIMEOUT))
            .await?
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))?;
        Ok(Box::new(Cursor::new(body.to_vec())))
    }

    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        let mut stream = self.call(url, None).await?.bytes_stream();
        let mut written = 0_u64;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|err| convert_reqwest_error(err, url))?;
            sink.write_all(&bytes)
                .map_err(|source| TransportError::Sink {
                    url: url.to_owned(),
                    source,
                })?;
            written = written.saturating_add(bytes.len() as u64);
        }
        Ok(written)
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
