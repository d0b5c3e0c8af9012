//! Authentication support for API requests
//!
//! Obtaining and refreshing tokens is left to the caller. The client only
//! needs something that can hand out a bearer token on demand, and the
//! project's secret key for the endpoints that take it in the body.

use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// Source of credentials for authenticated calls.
///
/// # Examples
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use ilovepdf::{AuthProvider, Result};
///
/// struct EnvAuth {
///     secret_key: String,
/// }
///
/// #[async_trait]
/// impl AuthProvider for EnvAuth {
///     async fn get_token(&self) -> Result<String> {
///         Ok(std::env::var("ILOVEPDF_TOKEN").unwrap_or_default())
///     }
///
///     fn secret_key(&self) -> &str {
///         &self.secret_key
///     }
/// }
/// ```
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// A bearer token valid for the next request
    async fn get_token(&self) -> Result<String>;

    /// The project's secret key
    fn secret_key(&self) -> &str;
}

/// An already issued token paired with its secret key
#[derive(Clone)]
pub struct StaticTokenAuth {
    token: String,
    secret_key: String,
}

impl StaticTokenAuth {
    /// Create from a token and a secret key
    pub fn new(token: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenAuth")
            .field("token", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn get_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

/// `Authorization` header value for a bearer token
pub fn bearer_header_value(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_value() {
        assert_eq!(bearer_header_value("token123"), "Bearer token123");
    }

    #[tokio::test]
    async fn test_static_token_auth() {
        let auth = StaticTokenAuth::new("jwt", "secret_abc");
        assert_eq!(auth.get_token().await.unwrap(), "jwt");
        assert_eq!(auth.secret_key(), "secret_abc");
    }

    #[test]
    fn test_debug_redacts() {
        let auth = StaticTokenAuth::new("jwt", "secret_abc");
        let printed = format!("{:?}", auth);
        assert!(!printed.contains("jwt"));
        assert!(!printed.contains("secret_abc"));
    }
}
