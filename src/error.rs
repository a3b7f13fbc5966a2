//! Error types for the Robust Links pipeline

use crate::schema::ItemId;
use thiserror::Error;

/// Failures reported by an item store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item {0} not found")]
    NotFound(ItemId),
    #[error("item store unavailable: {0}")]
    Unavailable(String),
}

/// Transport-level failures talking to the Robust Links service.
///
/// These never carry an HTTP status: a response with any status code is a
/// `RawResponse`, not a `TransportError`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid service endpoint {endpoint}: {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A 200 response whose payload breaks the service contract
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is missing `{0}`")]
    MissingField(&'static str),
}

/// Failure of the deferred attachment/note phase
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("attachment task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}
