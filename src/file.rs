//! Local files bound for upload
//!
//! A [`RemoteFile`] is usually built before the task that will own it has an
//! id. The task stamps its id later, so the multipart form is re-derived on
//! every [`RemoteFile::encode`] call and never stored.

use crate::Result;
use crate::body::{MultipartForm, MultipartPart};
use bytes::Bytes;

/// Field carrying the association id in the upload form
pub const TASK_FIELD: &str = "task";

/// Field carrying the file content in the upload form
pub const FILE_FIELD: &str = "file";

/// Raw file bytes plus the id of the task that currently owns them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    content: Bytes,
    filename: String,
    association_id: String,
}

/// A file written out as a multipart body
#[derive(Debug, Clone)]
pub struct EncodedFile {
    /// Complete `multipart/form-data` body
    pub body: Bytes,
    /// Content headers for the body, with canonical names
    pub headers: Vec<(String, String)>,
}

impl RemoteFile {
    /// Wrap bytes that will be uploaded under `filename`
    pub fn new(content: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            filename: filename.into(),
            association_id: String::new(),
        }
    }

    /// Read a file from disk, named after its basename
    pub async fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                crate::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("path has no file name: {}", path.display()),
                ))
            })?
            .to_string();
        let content = tokio::fs::read(path).await?;

        Ok(Self::new(content, filename))
    }

    /// Raw content
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Filename sent with the upload
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Id of the owning task, empty until one is assigned
    pub fn association_id(&self) -> &str {
        &self.association_id
    }

    /// Re-point this file at another task
    pub fn set_association_id(&mut self, id: impl Into<String>) {
        self.association_id = id.into();
    }

    /// Build the upload body from the current state.
    ///
    /// An unassigned association id encodes as an empty `task` field.
    pub fn encode(&self) -> EncodedFile {
        let form = MultipartForm::new()
            .part(MultipartPart::text(TASK_FIELD, self.association_id.clone()))
            .part(MultipartPart::file(
                FILE_FIELD,
                self.content.clone(),
                self.filename.clone(),
                Some("application/octet-stream".to_string()),
            ));

        let headers = form
            .headers()
            .into_iter()
            .map(|(name, value)| (canonical_header_name(&name), value))
            .collect();

        EncodedFile {
            body: form.to_bytes(),
            headers,
        }
    }
}

/// Whether `name` belongs to the content-type family
pub(crate) fn is_content_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("content-type") || name.eq_ignore_ascii_case("content-length")
}

/// Title-case the content-type family, leave other names untouched
pub(crate) fn canonical_header_name(name: &str) -> String {
    if name.eq_ignore_ascii_case("content-type") {
        "Content-Type".to_string()
    } else if name.eq_ignore_ascii_case("content-length") {
        "Content-Length".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_text(encoded: &EncodedFile) -> String {
        String::from_utf8_lossy(&encoded.body).into_owned()
    }

    #[test]
    fn test_upload_form_fields() {
        let mut file = RemoteFile::new(&b"PDF-BYTES"[..], "a.pdf");
        file.set_association_id("task123");

        let encoded = file.encode();
        let text = body_text(&encoded);

        assert!(text.contains("Content-Disposition: form-data; name=\"task\"\r\n\r\ntask123\r\n"));
        assert!(text.contains(
            "Content-Disposition: form-data; name=\"file\"; filename=\"a.pdf\"\r\n\
Content-Type: application/octet-stream\r\n\r\nPDF-BYTES\r\n"
        ));

        assert_eq!(encoded.headers.len(), 1);
        let (name, value) = &encoded.headers[0];
        assert_eq!(name, "Content-Type");
        assert!(value.starts_with("multipart/form-data; boundary="));

        let boundary = value.trim_start_matches("multipart/form-data; boundary=");
        assert!(text.starts_with(&format!("--{}\r\n", boundary)));
        assert!(text.ends_with(&format!("--{}--\r\n", boundary)));
    }

    #[test]
    fn test_unassigned_id_encodes_empty_field() {
        let file = RemoteFile::new(&b"x"[..], "x.pdf");
        assert_eq!(file.association_id(), "");

        let text = body_text(&file.encode());
        assert!(text.contains("name=\"task\"\r\n\r\n\r\n"));
    }

    #[test]
    fn test_reencode_reflects_new_id() {
        let mut file = RemoteFile::new(&b"x"[..], "x.pdf");
        file.set_association_id("first");
        assert!(body_text(&file.encode()).contains("\r\n\r\nfirst\r\n"));

        file.set_association_id("second");
        let text = body_text(&file.encode());
        assert!(text.contains("\r\n\r\nsecond\r\n"));
        assert!(!text.contains("first"));
    }

    #[test]
    fn test_encode_preserves_binary_content() {
        let raw: Vec<u8> = (0..=255u8).collect();
        let file = RemoteFile::new(raw.clone(), "bin.zip");
        let encoded = file.encode();

        assert!(encoded.body.windows(raw.len()).any(|w| w == &raw[..]));
    }

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("CONTENT-LENGTH"), "Content-Length");
        assert_eq!(canonical_header_name("x-custom"), "x-custom");
        assert!(is_content_header("Content-type"));
        assert!(!is_content_header("Authorization"));
    }

    #[tokio::test]
    async fn test_from_path_uses_basename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let file = RemoteFile::from_path(&path).await.unwrap();
        assert_eq!(file.filename(), "sample.pdf");
        assert_eq!(&file.content()[..], b"%PDF-1.4");
        assert_eq!(file.association_id(), "");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = RemoteFile::from_path("/definitely/not/here.pdf").await.unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
