use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use std::time::Duration;
use log::debug;
use thiserror::Error;

use crate::config::{ProductId, RunConfig};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("Invalid value for header '{name}'")]
    InvalidHeader { name: &'static str },
}

impl FetchError {
    /// 403 and 429 are what upstream bot mitigation answers with.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            FetchError::Status { status, .. }
                if *status == StatusCode::FORBIDDEN || *status == StatusCode::TOO_MANY_REQUESTS
        )
    }
}

/// Issues one GET and returns the body. Implementations must not retry.
pub trait Transport {
    fn get(&self, url: &str, headers: &HeaderMap) -> Result<String, FetchError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, headers: &HeaderMap) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status });
        }

        resp.text()
            .map_err(|source| FetchError::Request { url: url.to_string(), source })
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, headers: &HeaderMap) -> Result<String, FetchError> {
        (**self).get(url, headers)
    }
}

/// Fetches listing pages with the headers the active source asks for.
pub struct PageFetcher<T> {
    transport: T,
}

impl<T: Transport> PageFetcher<T> {
    pub fn new(transport: T) -> Self {
        PageFetcher { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn fetch(&self, url: &str, config: &RunConfig, product: &ProductId) -> Result<String, FetchError> {
        let headers = config.source.ruleset().headers(config, product)?;
        debug!("GET {} with {} headers", url, headers.len());
        self.transport.get(url, &headers)
    }
}
