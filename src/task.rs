//! Task handles, task descriptors and the factory seam
//!
//! The multi-step lifecycle of a task (start, upload, process, download)
//! lives with whoever implements [`TaskFactory`]. This module only carries
//! what the client needs to hand tasks out: which tools exist, what the
//! server says about a task, and how a file gets bound to its owner.

use crate::auth::AuthProvider;
use crate::config::ApiConfig;
use crate::file::RemoteFile;
use crate::transport::Transport;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Processing tools offered by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Reduce file size
    Compress,
    /// Edit PDF contents
    EditPdf,
    /// Extract text
    Extract,
    /// HTML to PDF
    HtmlPdf,
    /// Images to PDF
    ImagePdf,
    /// Combine PDFs
    Merge,
    /// Office documents to PDF
    OfficePdf,
    /// Add page numbers
    PageNumbers,
    /// Convert to PDF/A
    PdfA,
    /// PDF to images
    PdfJpg,
    /// OCR
    PdfOcr,
    /// Password protect
    Protect,
    /// Repair damaged files
    Repair,
    /// Rotate pages
    Rotate,
    /// Signature workflow
    Sign,
    /// Split into parts
    Split,
    /// Remove password
    Unlock,
    /// Check PDF/A conformance
    ValidatePdfA,
    /// Stamp a watermark
    Watermark,
}

impl Tool {
    /// Every known tool
    pub const ALL: [Tool; 19] = [
        Tool::Compress,
        Tool::EditPdf,
        Tool::Extract,
        Tool::HtmlPdf,
        Tool::ImagePdf,
        Tool::Merge,
        Tool::OfficePdf,
        Tool::PageNumbers,
        Tool::PdfA,
        Tool::PdfJpg,
        Tool::PdfOcr,
        Tool::Protect,
        Tool::Repair,
        Tool::Rotate,
        Tool::Sign,
        Tool::Split,
        Tool::Unlock,
        Tool::ValidatePdfA,
        Tool::Watermark,
    ];

    /// Wire name of the tool
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Compress => "compress",
            Tool::EditPdf => "editpdf",
            Tool::Extract => "extract",
            Tool::HtmlPdf => "htmlpdf",
            Tool::ImagePdf => "imagepdf",
            Tool::Merge => "merge",
            Tool::OfficePdf => "officepdf",
            Tool::PageNumbers => "pagenumbers",
            Tool::PdfA => "pdfa",
            Tool::PdfJpg => "pdfjpg",
            Tool::PdfOcr => "pdfocr",
            Tool::Protect => "protect",
            Tool::Repair => "repair",
            Tool::Rotate => "rotate",
            Tool::Sign => "sign",
            Tool::Split => "split",
            Tool::Unlock => "unlock",
            Tool::ValidatePdfA => "validatepdfa",
            Tool::Watermark => "watermark",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tool::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| Error::ToolNotFound(s.to_string()))
    }
}

/// A task as the server describes it in listings and lookups
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskDescriptor {
    /// Tool name; may be one this crate does not know
    pub tool: String,
    /// Task id
    pub task: String,
    /// Assigned processing server
    #[serde(default)]
    pub server: Option<String>,
    /// When processing began
    #[serde(default)]
    pub process_start: Option<String>,
    /// Status keyword
    #[serde(default)]
    pub status: Option<String>,
    /// Human readable status
    #[serde(default)]
    pub status_message: Option<String>,
    /// Processing time as reported
    #[serde(default, deserialize_with = "lenient::string")]
    pub timer: Option<String>,
    /// Input size in bytes
    #[serde(default, deserialize_with = "lenient::number")]
    pub filesize: Option<u64>,
    /// Output size in bytes
    #[serde(default, deserialize_with = "lenient::number")]
    pub output_filesize: Option<u64>,
    /// Number of output files
    #[serde(default, deserialize_with = "lenient::number")]
    pub output_filenumber: Option<u64>,
    /// Output extensions, as the server encodes them
    #[serde(default, deserialize_with = "lenient::string")]
    pub output_extensions: Option<String>,
    /// Number of input files
    #[serde(default, deserialize_with = "lenient::number")]
    pub file_number: Option<u64>,
    /// Name of the downloadable output
    #[serde(default)]
    pub download_filename: Option<String>,
}

/// Construction parameters for a task
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskParams {
    /// Existing task id, when rebuilding a task the server already has
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Assigned processing server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Tool specific parameters, passed through unchecked
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TaskParams {
    /// Parameters that rebuild the task a descriptor describes
    pub fn from_descriptor(descriptor: &TaskDescriptor) -> Self {
        Self {
            id: Some(descriptor.task.clone()),
            server: descriptor.server.clone(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Builds task objects by tool name.
///
/// Unknown tool names must fail with [`Error::ToolNotFound`]; the client
/// relies on that to skip descriptors it cannot rebuild.
pub trait TaskFactory: Send + Sync {
    /// Task type produced
    type Task;

    /// Create a task for `tool`
    fn new_task(
        &self,
        tool: &str,
        auth: Arc<dyn AuthProvider>,
        transport: Transport,
        params: TaskParams,
    ) -> Result<Self::Task>;
}

/// Factory producing [`Task`] handles for every [`Tool`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTaskFactory;

impl TaskFactory for DefaultTaskFactory {
    type Task = Task;

    fn new_task(
        &self,
        tool: &str,
        auth: Arc<dyn AuthProvider>,
        transport: Transport,
        params: TaskParams,
    ) -> Result<Task> {
        let tool = tool.parse()?;
        Ok(Task {
            tool,
            params,
            auth,
            transport,
        })
    }
}

/// A task handle bound to the shared auth provider and transport
#[derive(Clone)]
pub struct Task {
    tool: Tool,
    params: TaskParams,
    auth: Arc<dyn AuthProvider>,
    transport: Transport,
}

impl Task {
    /// The task's tool
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Server assigned id, if the task exists remotely
    pub fn id(&self) -> Option<&str> {
        self.params.id.as_deref()
    }

    /// Assigned processing server
    pub fn server(&self) -> Option<&str> {
        self.params.server.as_deref()
    }

    /// Construction parameters
    pub fn params(&self) -> &TaskParams {
        &self.params
    }

    /// Record the id and server handed out when the task starts
    pub fn assign(&mut self, id: impl Into<String>, server: impl Into<String>) {
        self.params.id = Some(id.into());
        self.params.server = Some(server.into());
    }

    /// Base URL of the assigned processing server
    pub fn server_url(&self, config: &ApiConfig) -> Option<String> {
        self.server().map(|server| config.server_url(server))
    }

    /// Point `file` at this task. Before an id is assigned the file gets an
    /// empty association id.
    pub fn bind_file(&self, file: &mut RemoteFile) {
        file.set_association_id(self.id().unwrap_or_default());
    }

    /// Shared auth provider
    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Shared transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("tool", &self.tool)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenAuth;
    use crate::backend::HttpBackend;
    use crate::backend::types::{BackendRequest, BackendResponse};
    use async_trait::async_trait;
    use serde_json::json;

    struct NoNetwork;

    #[async_trait]
    impl HttpBackend for NoNetwork {
        async fn execute(&self, _request: BackendRequest) -> Result<BackendResponse> {
            panic!("task construction must not touch the network")
        }
    }

    fn parts() -> (Arc<dyn AuthProvider>, Transport) {
        (
            Arc::new(StaticTokenAuth::new("tok", "secret")),
            Transport::with_backend(Arc::new(NoNetwork)),
        )
    }

    #[test]
    fn test_tool_round_trips_through_names() {
        for tool in Tool::ALL {
            assert_eq!(tool.as_str().parse::<Tool>().unwrap(), tool);
            assert_eq!(serde_json::to_value(tool).unwrap(), json!(tool.as_str()));
        }
    }

    #[test]
    fn test_unknown_tool() {
        let err = "doesnotexist".parse::<Tool>().unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(name) if name == "doesnotexist"));
    }

    #[test]
    fn test_descriptor_tolerates_mixed_types() {
        let descriptor: TaskDescriptor = serde_json::from_value(json!({
            "tool": "merge",
            "process_start": "2024-01-01 10:00:00",
            "status": "TaskSuccess",
            "status_message": "Task processed successfully",
            "timer": "0.512",
            "filesize": 1024,
            "output_filesize": "512",
            "output_filenumber": 1,
            "output_extensions": ["pdf"],
            "server": "api8.ilovepdf.com",
            "task": "t1",
            "file_number": "2",
            "download_filename": "merged.pdf"
        }))
        .unwrap();

        assert_eq!(descriptor.timer.as_deref(), Some("0.512"));
        assert_eq!(descriptor.filesize, Some(1024));
        assert_eq!(descriptor.output_filesize, Some(512));
        assert_eq!(descriptor.file_number, Some(2));
        assert_eq!(descriptor.output_extensions.as_deref(), Some(r#"["pdf"]"#));
    }

    #[test]
    fn test_descriptor_minimal() {
        let descriptor: TaskDescriptor =
            serde_json::from_value(json!({"tool": "merge", "task": "t1"})).unwrap();
        assert_eq!(descriptor.server, None);
        assert_eq!(descriptor.filesize, None);
    }

    #[test]
    fn test_default_factory() {
        let (auth, transport) = parts();
        let task = DefaultTaskFactory
            .new_task("compress", auth, transport, TaskParams::default())
            .unwrap();
        assert_eq!(task.tool(), Tool::Compress);
        assert_eq!(task.id(), None);

        let (auth, transport) = parts();
        let err = DefaultTaskFactory
            .new_task("nope", auth, transport, TaskParams::default())
            .unwrap_err();
        assert!(err.is_tool_not_found());
    }

    #[test]
    fn test_bind_file_follows_assignment() {
        let (auth, transport) = parts();
        let mut task = DefaultTaskFactory
            .new_task("merge", auth, transport, TaskParams::default())
            .unwrap();
        let mut file = RemoteFile::new(&b"x"[..], "x.pdf");

        task.bind_file(&mut file);
        assert_eq!(file.association_id(), "");

        task.assign("t42", "api3.ilovepdf.com");
        task.bind_file(&mut file);
        assert_eq!(file.association_id(), "t42");
        assert_eq!(
            task.server_url(&ApiConfig::default()).as_deref(),
            Some("https://api3.ilovepdf.com/v1")
        );
    }

    #[test]
    fn test_params_serialize_flat() {
        let mut params = TaskParams::default();
        params.extra.insert("rotate".into(), json!(90));
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({"rotate": 90}));
    }
}
