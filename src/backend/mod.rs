//! Backend abstraction for HTTP client implementations

pub mod types;

#[cfg(feature = "backend-reqwest")]
pub mod reqwest;

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use types::{BackendRequest, BackendResponse};

/// Configuration for backend creation
#[derive(Clone, Debug, Default)]
pub struct BackendConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Default headers to add to all requests
    pub default_headers: Option<http::HeaderMap>,
}

/// Something that can carry out a single HTTP exchange.
///
/// Implementations report faults where no response arrived as
/// [`crate::Error::Transport`]; a response with any status, 2xx or not, is
/// returned as `Ok`.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Execute an HTTP request
    async fn execute(&self, request: BackendRequest) -> Result<BackendResponse>;
}

/// The backend used when none is supplied
#[cfg(feature = "backend-reqwest")]
pub fn default_backend(config: BackendConfig) -> Result<Arc<dyn HttpBackend>> {
    Ok(Arc::new(reqwest::ReqwestBackend::with_config(config)?))
}

/// The backend used when none is supplied
#[cfg(not(feature = "backend-reqwest"))]
pub fn default_backend(_config: BackendConfig) -> Result<Arc<dyn HttpBackend>> {
    Err(crate::Error::Internal(
        "no HTTP backend compiled in; enable `backend-reqwest` or supply one".to_string(),
    ))
}
