//! Transport adapter: JSON and binary exchanges under one interface
//!
//! Each call is independent. There is no queue, no retry and no state kept
//! between calls; callers that want retries wrap these methods themselves.

use crate::backend::types::{BackendRequest, BackendResponse};
use crate::backend::{self, BackendConfig, HttpBackend};
use crate::body::Body;
use crate::file::{canonical_header_name, is_content_header};
use crate::request::{JSON_CONTENT_TYPE, RequestOptions};
use crate::response::RequestResult;
use crate::{Error, Result, TransportError};
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use std::sync::Arc;
use url::Url;

/// Executes GET/POST/PUT/DELETE against absolute URLs
#[derive(Clone)]
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
}

impl Transport {
    /// Create a transport over the default backend
    pub fn new() -> Result<Self> {
        Self::with_config(BackendConfig::default())
    }

    /// Create a transport over the default backend with configuration
    pub fn with_config(config: BackendConfig) -> Result<Self> {
        Ok(Self::with_backend(backend::default_backend(config)?))
    }

    /// Create a transport over a specific backend
    pub fn with_backend(backend: Arc<dyn HttpBackend>) -> Self {
        Self { backend }
    }

    /// Issue a GET request
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<RequestResult> {
        self.make_request(Method::GET, url, None, options).await
    }

    /// Issue a POST request; a file body is sent as multipart
    pub async fn post(
        &self,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<RequestResult> {
        self.make_request(Method::POST, url, body, options).await
    }

    /// Issue a PUT request; a file body is sent as multipart
    pub async fn put(
        &self,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<RequestResult> {
        self.make_request(Method::PUT, url, body, options).await
    }

    /// Issue a DELETE request
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<RequestResult> {
        self.make_request(Method::DELETE, url, None, options).await
    }

    async fn make_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<RequestResult> {
        let request = build_request(method, url, body, &options)?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            credentialed = request.with_credentials,
            binary = options.binary,
            "sending request"
        );

        let response = self.backend.execute(request).await.inspect_err(|e| {
            tracing::warn!(url, error = %e, "request failed without a response");
        })?;

        tracing::debug!(url, status = response.status.as_u16(), "received response");

        decode_response(response, &options)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

pub(crate) fn build_request(
    method: Method,
    url: &str,
    body: Option<Body>,
    options: &RequestOptions,
) -> Result<BackendRequest> {
    let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

    let mut headers: Vec<(String, String)> =
        vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())];

    for (name, value) in &options.headers {
        if is_content_header(name) {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        }
        headers.push((name.clone(), value.clone()));
    }

    let body = match body {
        None => None,
        Some(Body::Json { value }) => Some(Bytes::from(serde_json::to_vec(&value)?)),
        Some(Body::File(file)) => {
            let encoded = file.encode();
            merge_injected(&mut headers, encoded.headers);
            Some(encoded.body)
        }
    };

    Ok(BackendRequest {
        method,
        url,
        headers: to_header_map(&headers)?,
        body,
        with_credentials: options.is_credentialed(),
    })
}

/// Injected headers replace same-named caller headers in the content-type
/// family only; everything else is appended alongside.
fn merge_injected(headers: &mut Vec<(String, String)>, injected: Vec<(String, String)>) {
    for (name, value) in injected {
        let name = canonical_header_name(&name);
        if is_content_header(&name) {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        }
        headers.push((name, value));
    }
}

fn to_header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Internal(format!("Invalid header name {:?}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::Internal(format!("Invalid value for header {}: {}", name, e)))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

fn decode_response(response: BackendResponse, options: &RequestOptions) -> Result<RequestResult> {
    if !response.is_success() {
        let error = TransportError::from_response(response.status, &response.body);
        tracing::warn!(
            status = error.status,
            code = ?error.code,
            message = %error.message,
            "request rejected"
        );
        return Err(error.into());
    }

    if options.binary {
        return Ok(RequestResult::Binary(response.body));
    }

    let text = String::from_utf8_lossy(&response.body);
    let value = match &options.transform_response {
        Some(transform) => transform.apply(&text)?,
        None => serde_json::Value::String(text.into_owned()),
    };

    Ok(RequestResult::Value(value))
}
