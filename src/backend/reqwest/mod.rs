//! Reqwest backend for cross-platform HTTP support

use crate::backend::types::{BackendRequest, BackendResponse};
use crate::backend::{BackendConfig, HttpBackend};
use crate::{Error, Result, TransportError};
use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::StreamExt;

/// Reqwest backend for cross-platform HTTP
#[derive(Clone, Debug)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a new Reqwest backend
    pub fn new() -> Result<Self> {
        Self::with_config(BackendConfig::default())
    }

    /// Create a new Reqwest backend with configuration
    pub fn with_config(config: BackendConfig) -> Result<Self> {
        // The upload endpoint expects `Content-Type`, not `content-type`.
        let mut builder = reqwest::Client::builder().http1_title_case_headers();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if let Some(default_headers) = config.default_headers {
            builder = builder.default_headers(default_headers);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create reqwest client: {}", e)))?;

        Ok(Self { client })
    }

}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: BackendRequest) -> Result<BackendResponse> {
        tracing::trace!(
            method = %request.method,
            url = %request.url,
            with_credentials = request.with_credentials,
            "reqwest dispatch"
        );

        let mut req_builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await.map_err(network_error)?;

        let status = response.status();
        let headers = response.headers().clone();

        // Chunks are appended as-is; no charset handling happens here.
        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.map_err(network_error)?);
        }

        Ok(BackendResponse {
            status,
            headers,
            body: body.freeze(),
        })
    }
}

fn network_error(e: reqwest::Error) -> Error {
    let status = e.status().map(|s| s.as_u16());
    TransportError::network(status, e.to_string()).into()
}
