//! Async client for the iLovePDF document-processing API
//!
//! The API is stateless REST plus multipart uploads. This crate wraps it in
//! a [`Client`] that hands out task objects, a [`Transport`] that speaks
//! both JSON and raw binary, and a [`RemoteFile`] that is re-encoded for
//! upload each time it is sent, so it always carries its current owner.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub use auth::{AuthProvider, StaticTokenAuth};
pub use backend::types::{BackendRequest, BackendResponse};
pub use backend::{BackendConfig, HttpBackend};
pub use body::{Body, MultipartForm, MultipartPart};
pub use client::{Client, ClientBuilder, DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, ListTasksFilter};
pub use config::ApiConfig;
pub use error::{Error, Result, TransportError};
pub use file::{EncodedFile, RemoteFile};
pub use request::{RequestOptions, ResponseTransform};
pub use response::RequestResult;
pub use task::{DefaultTaskFactory, Task, TaskDescriptor, TaskFactory, TaskParams, Tool};
pub use transport::Transport;

#[cfg(feature = "backend-reqwest")]
pub use backend::reqwest::ReqwestBackend;

pub mod auth;
pub mod backend;
mod body;
mod client;
pub mod config;
mod error;
mod file;
pub mod request;
mod response;
pub mod task;
mod transport;
