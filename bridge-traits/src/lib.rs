//! # Bridge Traits
//!
//! Seam traits between the upload core and its external collaborators.
//!
//! ## Overview
//!
//! This crate defines the contracts the core depends on but does not
//! implement itself:
//!
//! - [`HttpClient`](http::HttpClient): async HTTP transport used by the
//!   OAuth adapter and the Drive provider
//! - [`FileStorage`](storage::FileStorage): the remote object-store
//!   collaborator (create / publish / get / list / delete)
//!
//! Production wiring uses the reqwest-backed client from `bridge-http` and
//! the Drive connector from `provider-google-drive`; tests substitute mocks
//! for either seam.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert transport-specific errors into it and keep messages actionable.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so they can be shared across async
//! tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{FileInfo, FileStorage, StorageFactory, UploadResult};
