//! Request body types and multipart form writing

use crate::file::RemoteFile;
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Request body accepted by `post` and `put`
#[derive(Debug, Clone)]
pub enum Body {
    /// JSON data
    Json {
        /// JSON value
        value: serde_json::Value,
    },

    /// A local file, multipart encoded at send time
    File(RemoteFile),
}

impl Body {
    /// Create a JSON body
    pub fn json(value: impl serde::Serialize) -> Result<Self, crate::Error> {
        Ok(Self::Json {
            value: serde_json::to_value(value)?,
        })
    }

    /// Create a file body
    pub fn file(file: RemoteFile) -> Self {
        Self::File(file)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json { value }
    }
}

impl From<RemoteFile> for Body {
    fn from(file: RemoteFile) -> Self {
        Self::File(file)
    }
}

/// A part of multipart form data
#[derive(Debug, Clone)]
pub struct MultipartPart {
    /// Field name
    pub name: String,
    /// Content
    pub content: Bytes,
    /// Content type
    pub content_type: Option<String>,
    /// Filename
    pub filename: Option<String>,
}

impl MultipartPart {
    /// Create a plain field part
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into().into(),
            content_type: None,
            filename: None,
        }
    }

    /// Create a file part
    pub fn file(
        name: impl Into<String>,
        content: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            content_type,
            filename: Some(filename.into()),
        }
    }
}

/// A `multipart/form-data` body under construction.
///
/// Header names come out the way `http::HeaderName` renders them, all lower
/// case. Callers that forward them to a case-sensitive consumer must
/// canonicalize first.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<MultipartPart>,
}

impl MultipartForm {
    /// Start an empty form with a fresh boundary
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Start an empty form with a fixed boundary
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Append a part
    pub fn part(mut self, part: MultipartPart) -> Self {
        self.parts.push(part);
        self
    }

    /// The boundary separating parts
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Content headers describing this form
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![(
            http::header::CONTENT_TYPE.as_str().to_string(),
            format!("multipart/form-data; boundary={}", self.boundary),
        )]
    }

    /// Write the form out
    pub fn to_bytes(&self) -> Bytes {
        let mut data = BytesMut::new();

        for part in &self.parts {
            data.put_slice(format!("--{}\r\n", self.boundary).as_bytes());

            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(filename) = &part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
            }
            data.put_slice(disposition.as_bytes());
            data.put_slice(b"\r\n");

            if let Some(content_type) = &part.content_type {
                data.put_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }

            data.put_slice(b"\r\n");
            data.put_slice(&part.content);
            data.put_slice(b"\r\n");
        }

        data.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        data.freeze()
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_boundary() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("----formdata-ilovepdf-{}{:04}", timestamp, seq)
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_layout() {
        let form = MultipartForm::with_boundary("XYZ")
            .part(MultipartPart::text("task", "t1"))
            .part(MultipartPart::file("file", &b"abc"[..], "a.pdf", None));

        let body = form.to_bytes();
        assert_eq!(
            &body[..],
            &b"--XYZ\r\n\
Content-Disposition: form-data; name=\"task\"\r\n\r\n\
t1\r\n\
--XYZ\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"a.pdf\"\r\n\r\n\
abc\r\n\
--XYZ--\r\n"[..]
        );
    }

    #[test]
    fn test_headers_are_lower_case() {
        let form = MultipartForm::with_boundary("b");
        assert_eq!(
            form.headers(),
            vec![(
                "content-type".to_string(),
                "multipart/form-data; boundary=b".to_string()
            )]
        );
    }

    #[test]
    fn test_boundaries_are_unique() {
        assert_ne!(MultipartForm::new().boundary(), MultipartForm::new().boundary());
    }

    #[test]
    fn test_filename_quotes_are_escaped() {
        let form = MultipartForm::with_boundary("b")
            .part(MultipartPart::file("file", Bytes::new(), "we\"ird.pdf", None));
        let body = String::from_utf8_lossy(&form.to_bytes()).into_owned();
        assert!(body.contains("filename=\"we\\\"ird.pdf\""));
    }

    #[test]
    fn test_filename_line_breaks_are_encoded() {
        let form = MultipartForm::with_boundary("b")
            .part(MultipartPart::file("file", &b"abc"[..], "a\r\nb\n.pdf", None));
        let body = String::from_utf8_lossy(&form.to_bytes()).into_owned();

        assert!(body.contains("filename=\"a%0D%0Ab%0A.pdf\"\r\n\r\nabc\r\n"));
        assert_eq!(body.matches("\r\n").count(), 5);
    }

    #[test]
    fn test_json_body() {
        let body = Body::json(serde_json::json!({"secret_key": "abc"})).unwrap();
        match body {
            Body::Json { value } => assert_eq!(value["secret_key"], "abc"),
            _ => panic!("Expected Body::Json variant"),
        }
    }
}
