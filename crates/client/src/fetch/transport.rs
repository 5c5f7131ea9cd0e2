//! HTTP transport seam and its reqwest implementation.

use async_trait::async_trait;
use cfpdf_core::{AppConfig, Error};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::{Duration, Instant};

use super::identity::IdentityProfile;

/// Configuration for the reqwest transport.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { max_bytes: 5 * 1024 * 1024, timeout: Duration::from_millis(10_000), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { max_bytes: config.max_bytes, timeout: config.timeout(), max_redirects: config.max_redirects }
    }
}

/// Status and decoded body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Failures below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("response too large: {0} bytes exceeds {1}")]
    TooLarge(usize, usize),
}

/// Given a URL and an identity, return a status and body or a transport failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, identity: &IdentityProfile) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport with rustls and bounded redirects.
pub struct ReqwestTransport {
    http: Client,
    config: FetchConfig,
}

impl ReqwestTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Build a header map from a profile, skipping entries that are not valid headers.
pub fn identity_headers(identity: &IdentityProfile) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in identity.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::debug!("skipping invalid header {name} in profile {}", identity.name),
        }
    }
    headers
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, identity: &IdentityProfile) -> Result<TransportResponse, TransportError> {
        let start = Instant::now();

        let response = self
            .http
            .get(url)
            .headers(identity_headers(identity))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(TransportError::TooLarge(len as usize, self.config.max_bytes));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(TransportError::TooLarge(bytes.len(), self.config.max_bytes));
        }

        tracing::debug!(
            "fetched {} as {} -> {} in {}ms ({} bytes)",
            url,
            identity.name,
            status,
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(TransportResponse { status, body: String::from_utf8_lossy(&bytes).into_owned() })
    }
}
