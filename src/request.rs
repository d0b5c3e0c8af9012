//! Per-call request options

use crate::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Name of the header that marks a request as credentialed
pub const AUTHORIZATION: &str = "Authorization";

/// Default content type for JSON bodied requests
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Turns a textual response body into a value
#[derive(Clone)]
pub struct ResponseTransform(Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>);

impl ResponseTransform {
    /// Wrap a custom transform
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Parse the body as JSON
    pub fn json() -> Self {
        Self::new(|text| Ok(serde_json::from_str(text)?))
    }

    pub(crate) fn apply(&self, text: &str) -> Result<Value> {
        (self.0)(text)
    }
}

impl fmt::Debug for ResponseTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseTransform(..)")
    }
}

/// Options for a single transport call
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Ordered headers; a name may appear more than once
    pub headers: Vec<(String, String)>,
    /// Applied to textual responses
    pub transform_response: Option<ResponseTransform>,
    /// Return the body untouched as bytes
    pub binary: bool,
}

impl RequestOptions {
    /// Empty options: no headers, no transform, textual response
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append `Authorization: Bearer <token>`
    pub fn bearer(self, token: &str) -> Self {
        let value = crate::auth::bearer_header_value(token);
        self.header(AUTHORIZATION, value)
    }

    /// Set the response transform
    pub fn transform(mut self, transform: ResponseTransform) -> Self {
        self.transform_response = Some(transform);
        self
    }

    /// Parse the response as JSON
    pub fn json(self) -> Self {
        self.transform(ResponseTransform::json())
    }

    /// Return the raw response bytes
    pub fn binary(mut self) -> Self {
        self.binary = true;
        self
    }

    /// Whether an `Authorization` header is present
    pub fn is_credentialed(&self) -> bool {
        self.headers.iter().any(|(name, _)| name == AUTHORIZATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentialed_follows_authorization() {
        assert!(!RequestOptions::new().header("X-Trace", "1").is_credentialed());
        assert!(RequestOptions::new().bearer("abc").is_credentialed());
        assert!(
            RequestOptions::new()
                .header("Authorization", "Basic xyz")
                .is_credentialed()
        );
    }

    #[test]
    fn test_headers_keep_order_and_repeats() {
        let options = RequestOptions::new()
            .header("Accept", "application/json")
            .header("Accept", "application/pdf")
            .bearer("tok");

        assert_eq!(
            options.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/pdf".to_string()),
                ("Authorization".to_string(), "Bearer tok".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_transform() {
        let value = ResponseTransform::json().apply(r#"{"a":1}"#).unwrap();
        assert_eq!(value["a"], 1);
        assert!(ResponseTransform::json().apply("not json").is_err());
    }
}
