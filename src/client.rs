//! API client: task creation, lookup, listing and signature management

use crate::auth::AuthProvider;
use crate::backend::HttpBackend;
use crate::config::ApiConfig;
use crate::request::RequestOptions;
use crate::task::{DefaultTaskFactory, TaskDescriptor, TaskFactory, TaskParams};
use crate::transport::Transport;
use crate::{Body, Result};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Default page for signature listings
pub const DEFAULT_PAGE: u32 = 0;

/// Default page size for signature listings. The server rejects more than 100.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Filters for [`Client::list_tasks`]; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListTasksFilter {
    /// Result page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Only tasks of this tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Only tasks with this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Only tasks tagged with this custom integer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_int: Option<i64>,
}

impl ListTasksFilter {
    /// No filtering
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Filter by tool
    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Filter by status
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Filter by custom integer
    pub fn custom_int(mut self, custom_int: i64) -> Self {
        self.custom_int = Some(custom_int);
        self
    }
}

#[derive(Serialize)]
struct ListTasksBody<'a> {
    secret_key: &'a str,
    #[serde(flatten)]
    filter: &'a ListTasksFilter,
}

/// Which set of a signature's files to download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureFiles {
    Original,
    Signed,
    Audit,
}

impl SignatureFiles {
    fn path_suffix(self) -> &'static str {
        match self {
            SignatureFiles::Original => "download-original",
            SignatureFiles::Signed => "download-signed",
            SignatureFiles::Audit => "download-audit",
        }
    }
}

/// Client for the document-processing API.
///
/// Holds the auth provider and transport shared by every task it creates.
/// No signature or task state is tracked here; each call is a fresh
/// authenticated round trip.
///
/// # Examples
///
/// ```rust,no_run
/// use ilovepdf::{Client, StaticTokenAuth, TaskParams};
///
/// # #[tokio::main]
/// # async fn main() -> ilovepdf::Result<()> {
/// let client = Client::new(StaticTokenAuth::new("<jwt>", "<secret_key>"))?;
///
/// let task = client.new_task("merge", TaskParams::default())?;
/// assert_eq!(task.id(), None);
///
/// let signatures = client.get_signature_list(None, Some(50)).await?;
/// println!("{signatures}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client<F = DefaultTaskFactory> {
    config: ApiConfig,
    auth: Arc<dyn AuthProvider>,
    transport: Transport,
    factory: F,
}

impl Client {
    /// Create a client with default configuration
    pub fn new(auth: impl AuthProvider + 'static) -> Result<Self> {
        Self::builder(auth).build()
    }

    /// Create a client builder
    pub fn builder(auth: impl AuthProvider + 'static) -> ClientBuilder {
        ClientBuilder::new(Arc::new(auth))
    }
}

impl<F: TaskFactory> Client<F> {
    /// Allocate a task bound to this client's auth and transport.
    ///
    /// Nothing is sent; the task's own lifecycle does the network work.
    pub fn new_task(&self, tool: &str, params: TaskParams) -> Result<F::Task> {
        self.factory
            .new_task(tool, self.auth.clone(), self.transport.clone(), params)
    }

    /// Fetch a task the server already has
    pub async fn get_task(&self, id: &str) -> Result<F::Task> {
        let url = self.config.url(&format!("task/{}", urlencoding::encode(id)));
        let descriptor: TaskDescriptor = self
            .transport
            .get(&url, self.authorized().await?)
            .await?
            .into_json()?;

        self.rebuild(&descriptor)
    }

    /// List tasks, rebuilding each one through the task factory.
    ///
    /// Descriptors whose tool the factory does not recognize are skipped;
    /// any other failure aborts the listing.
    pub async fn list_tasks(&self, filter: ListTasksFilter) -> Result<Vec<F::Task>> {
        let body = Body::json(ListTasksBody {
            secret_key: self.auth.secret_key(),
            filter: &filter,
        })?;
        let descriptors: Vec<TaskDescriptor> = self
            .transport
            .post(&self.config.url("task"), Some(body), self.authorized().await?)
            .await?
            .into_json()?;

        let mut tasks = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            match self.rebuild(descriptor) {
                Ok(task) => tasks.push(task),
                Err(e) if e.is_tool_not_found() => {
                    tracing::warn!(
                        tool = %descriptor.tool,
                        task = %descriptor.task,
                        "skipping task with unrecognized tool"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(tasks)
    }

    fn rebuild(&self, descriptor: &TaskDescriptor) -> Result<F::Task> {
        self.factory.new_task(
            &descriptor.tool,
            self.auth.clone(),
            self.transport.clone(),
            TaskParams::from_descriptor(descriptor),
        )
    }
}

impl<F> Client<F> {
    /// Current status of a signature request
    pub async fn get_signature_status(&self, token: &str) -> Result<Value> {
        let url = self.signature_url(&format!("requesterview/{}", urlencoding::encode(token)));
        self.transport
            .get(&url, self.authorized().await?)
            .await?
            .into_json()
    }

    /// One page of signature requests.
    ///
    /// `page` defaults to 0 and `page_limit` to 20. Limits above the
    /// server's maximum of 100 are passed through and rejected remotely.
    pub async fn get_signature_list(
        &self,
        page: Option<u32>,
        page_limit: Option<u32>,
    ) -> Result<Value> {
        let url = self.signature_url(&format!(
            "list?page={}&per-page={}",
            page.unwrap_or(DEFAULT_PAGE),
            page_limit.unwrap_or(DEFAULT_PAGE_LIMIT)
        ));
        self.transport
            .get(&url, self.authorized().await?)
            .await?
            .into_json()
    }

    /// Cancel a signature request that is still in progress
    pub async fn void_signature(&self, token: &str) -> Result<Value> {
        let url = self.signature_url(&format!("void/{}", urlencoding::encode(token)));
        self.transport
            .put(&url, None, self.authorized().await?)
            .await?
            .into_json()
    }

    /// Give receivers `days` more days before the request expires
    pub async fn increase_signature_expiration_days(
        &self,
        token: &str,
        days: u32,
    ) -> Result<Value> {
        let url = self.signature_url(&format!(
            "increase-expiration-days/{}",
            urlencoding::encode(token)
        ));
        self.transport
            .put(&url, Some(json!({ "days": days }).into()), self.authorized().await?)
            .await?
            .into_json()
    }

    /// Email pending receivers a reminder. Subject to a daily quota.
    pub async fn send_reminders(&self, token: &str) -> Result<Value> {
        let url = self.signature_url(&format!("sendReminders/{}", urlencoding::encode(token)));
        self.transport
            .post(&url, None, self.authorized().await?)
            .await?
            .into_json()
    }

    /// Files as they were submitted for signing
    pub async fn download_original_files(&self, token: &str) -> Result<Bytes> {
        self.download_signature_files(token, SignatureFiles::Original)
            .await
    }

    /// Files with the collected signatures applied
    pub async fn download_signed_files(&self, token: &str) -> Result<Bytes> {
        self.download_signature_files(token, SignatureFiles::Signed)
            .await
    }

    /// Audit trail documents
    pub async fn download_audit_files(&self, token: &str) -> Result<Bytes> {
        self.download_signature_files(token, SignatureFiles::Audit)
            .await
    }

    /// Details of one receiver
    pub async fn get_receiver_info(&self, receiver_token: &str) -> Result<Value> {
        let url = self.signature_url(&format!(
            "receiver/info/{}",
            urlencoding::encode(receiver_token)
        ));
        self.transport
            .get(&url, self.authorized().await?)
            .await?
            .into_json()
    }

    /// Correct a receiver's email after a bounce
    pub async fn fix_receiver_email(&self, receiver_token: &str, email: &str) -> Result<Value> {
        let url = self.signature_url(&format!(
            "signer/fix-email/{}",
            urlencoding::encode(receiver_token)
        ));
        self.transport
            .put(&url, Some(json!({ "email": email }).into()), self.authorized().await?)
            .await?
            .into_json()
    }

    /// Correct a signer's mobile number after a failed SMS
    pub async fn fix_receiver_phone(&self, receiver_token: &str, phone: &str) -> Result<Value> {
        let url = self.signature_url(&format!(
            "signer/fix-phone/{}",
            urlencoding::encode(receiver_token)
        ));
        self.transport
            .put(&url, Some(json!({ "phone": phone }).into()), self.authorized().await?)
            .await?
            .into_json()
    }

    /// Endpoint configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Shared transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    async fn download_signature_files(&self, token: &str, files: SignatureFiles) -> Result<Bytes> {
        let url = self.signature_url(&format!(
            "{}/{}",
            urlencoding::encode(token),
            files.path_suffix()
        ));
        self.transport
            .get(&url, self.authorized().await?.binary())
            .await?
            .into_bytes()
    }

    async fn authorized(&self) -> Result<RequestOptions> {
        let token = self.auth.get_token().await?;
        Ok(RequestOptions::new().bearer(&token).json())
    }

    fn signature_url(&self, path: &str) -> String {
        self.config.url(&format!("signature/{}", path))
    }
}

/// Builder for creating API clients
pub struct ClientBuilder<F = DefaultTaskFactory> {
    auth: Arc<dyn AuthProvider>,
    config: ApiConfig,
    backend: Option<Arc<dyn HttpBackend>>,
    factory: F,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            config: ApiConfig::default(),
            backend: None,
            factory: DefaultTaskFactory,
        }
    }
}

impl<F> ClientBuilder<F> {
    /// Replace the whole endpoint configuration
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the URL scheme
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.config.protocol = protocol.into();
        self
    }

    /// Set the API host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the API version segment
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Use a specific HTTP backend instead of the default one
    pub fn backend(mut self, backend: Arc<dyn HttpBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use a different task factory
    pub fn task_factory<G: TaskFactory>(self, factory: G) -> ClientBuilder<G> {
        ClientBuilder {
            auth: self.auth,
            config: self.config,
            backend: self.backend,
            factory,
        }
    }

    /// Build the client
    pub fn build(self) -> Result<Client<F>> {
        let transport = match self.backend {
            Some(backend) => Transport::with_backend(backend),
            None => Transport::with_config(self.config.backend_config())?,
        };

        Ok(Client {
            config: self.config,
            auth: self.auth,
            transport,
            factory: self.factory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_serializes_only_set_fields() {
        let filter = ListTasksFilter::new().page(0).tool("merge");
        let body = serde_json::to_value(ListTasksBody {
            secret_key: "abc",
            filter: &filter,
        })
        .unwrap();
        assert_eq!(body, json!({"secret_key": "abc", "page": 0, "tool": "merge"}));
    }

    #[test]
    fn test_signature_file_paths() {
        assert_eq!(SignatureFiles::Original.path_suffix(), "download-original");
        assert_eq!(SignatureFiles::Signed.path_suffix(), "download-signed");
        assert_eq!(SignatureFiles::Audit.path_suffix(), "download-audit");
    }
}
