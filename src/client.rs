//! Robust Links service client
//!
//! One GET per invocation. Status codes are returned raw; interpretation lives
//! in `interpret`.

use crate::error::TransportError;
use crate::schema::ArchiveRequest;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Public Robust Links API
pub const DEFAULT_ENDPOINT: &str = "https://robustlinks.mementoweb.org/api/";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Raw status and body, uninterpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The archiving call consumed by the pipeline
#[async_trait]
pub trait ArchiveApi: Send + Sync {
    async fn call(&self, request: &ArchiveRequest) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed client for the Robust Links API
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ArchiveClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let endpoint = Url::parse(endpoint).map_err(|source| TransportError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("robust-links/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { http, endpoint })
    }

    /// Client for the public service with the default timeout
    pub fn public() -> Result<Self, TransportError> {
        Self::new(DEFAULT_ENDPOINT, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// Full API URL for a request, query values percent-encoded
    pub fn request_url(&self, request: &ArchiveRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("url", &request.target_url);
            if let Some(archive) = &request.archive_hint {
                query.append_pair("archive", archive);
            }
            if request.force_urir_mode {
                query.append_pair("urir_shortcircuit", "True");
            }
        }
        url
    }
}

#[async_trait]
impl ArchiveApi for ArchiveClient {
    async fn call(&self, request: &ArchiveRequest) -> Result<RawResponse, TransportError> {
        let api_url = self.request_url(request);
        debug!(target_url = %request.target_url, api_url = %api_url, "sending archive request");

        let response = self
            .http
            .get(api_url.clone())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: api_url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| TransportError::Body {
            url: api_url.to_string(),
            source,
        })?;

        debug!(status, "archive response received");
        Ok(RawResponse { status, body })
    }
}
