//! Transport call results

use crate::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What a successful transport call yields: a decoded value or raw bytes
#[derive(Debug, Clone, PartialEq)]
pub enum RequestResult {
    /// Output of the response transform, or the raw text as a string value
    Value(Value),
    /// Untouched response body
    Binary(Bytes),
}

impl RequestResult {
    /// The decoded value, if this is not a binary result
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            RequestResult::Value(value) => Some(value),
            RequestResult::Binary(_) => None,
        }
    }

    /// Deserialize the decoded value
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            RequestResult::Value(value) => Ok(serde_json::from_value(value)?),
            RequestResult::Binary(_) => Err(Error::Internal(
                "expected a decoded response, got binary".to_string(),
            )),
        }
    }

    /// Take the raw bytes
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            RequestResult::Binary(bytes) => Ok(bytes),
            RequestResult::Value(_) => Err(Error::Internal(
                "expected a binary response, got a decoded value".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_json() {
        let result = RequestResult::Value(json!({"token": "t"}));
        let parsed: std::collections::HashMap<String, String> = result.into_json().unwrap();
        assert_eq!(parsed["token"], "t");
    }

    #[test]
    fn test_kind_mismatch() {
        assert!(RequestResult::Value(json!(1)).into_bytes().is_err());
        assert!(
            RequestResult::Binary(Bytes::from_static(b"%PDF"))
                .into_json::<Value>()
                .is_err()
        );
        assert_eq!(RequestResult::Binary(Bytes::new()).as_value(), None);
    }
}
