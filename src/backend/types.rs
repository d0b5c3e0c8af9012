//! Shared types between backend implementations

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// Backend-agnostic HTTP request
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// HTTP method for the request
    pub method: Method,
    /// Absolute URL for the request
    pub url: Url,
    /// Headers for the request
    pub headers: HeaderMap,
    /// Optional encoded body
    pub body: Option<Bytes>,
    /// Whether the request carries credentials
    pub with_credentials: bool,
}

/// Backend-agnostic HTTP response, body fully read
#[derive(Debug, Clone)]
pub struct BackendResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Bytes,
}

impl BackendResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
