//! API endpoint configuration

use serde::Deserialize;
use std::time::Duration;

/// Protocol used to reach the API
pub const DEFAULT_PROTOCOL: &str = "https";

/// API host
pub const DEFAULT_HOST: &str = "api.ilovepdf.com";

/// API version path segment
pub const DEFAULT_VERSION: &str = "v1";

/// Where the API lives and how to talk to it
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// URL scheme, `https` unless testing
    pub protocol: String,
    /// Host, optionally with a port
    pub host: String,
    /// Version path segment
    pub version: String,
    /// Per-request timeout
    #[serde(with = "secs_option")]
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            host: DEFAULT_HOST.to_string(),
            version: DEFAULT_VERSION.to_string(),
            timeout: None,
            user_agent: Some(concat!("ilovepdf-rs/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl ApiConfig {
    /// `{protocol}://{host}/{version}`
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}/{}",
            self.protocol,
            self.host.trim_end_matches('/'),
            self.version.trim_matches('/')
        )
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Base URL of a task's assigned processing server
    pub fn server_url(&self, server: &str) -> String {
        format!(
            "{}://{}/{}",
            self.protocol,
            server.trim_end_matches('/'),
            self.version.trim_matches('/')
        )
    }

    pub(crate) fn backend_config(&self) -> crate::backend::BackendConfig {
        crate::backend::BackendConfig {
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            default_headers: None,
        }
    }
}

mod secs_option {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url(), "https://api.ilovepdf.com/v1");
        assert_eq!(config.url("/task"), "https://api.ilovepdf.com/v1/task");
        assert_eq!(
            config.server_url("api11.ilovepdf.com"),
            "https://api11.ilovepdf.com/v1"
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"protocol":"http","host":"127.0.0.1:8080","timeout":30}"#)
                .unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:8080/v1");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.user_agent.is_some());
    }
}
