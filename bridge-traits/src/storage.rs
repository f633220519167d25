//! Remote File Storage Abstraction
//!
//! Defines the contract the upload core expects from a cloud file-storage
//! collaborator. Every call is authorized with the caller-supplied OAuth
//! access token carried by the implementation, never a fixed service
//! identity.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Result of a create-and-publish upload.
///
/// Pass-through record from the storage collaborator; the core does not own
/// or mutate it beyond returning it to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Storage-side object identifier
    pub file_id: String,
    /// Name the object was stored under
    pub file_name: String,
    /// Browser-facing link
    pub web_view_link: String,
    /// Direct-download link
    pub web_content_link: String,
    /// MIME type the object was stored with
    pub mime_type: String,
    /// Size in bytes, as reported by the provider (string-typed on the wire)
    pub size: Option<String>,
}

/// Metadata for a stored object, as returned by get/list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub web_view_link: String,
    pub web_content_link: String,
    pub size: Option<String>,
    pub created_time: Option<String>,
}

/// Remote file storage trait
///
/// Abstracts the object-store API (Google Drive in production) so the
/// upload orchestrator can be exercised against fakes.
///
/// # Contract notes
///
/// - `create` and `set_public_read_permission` form one logical operation
///   for callers: when the permission grant fails after creation, the error
///   propagates and the object may exist without being public. There is no
///   compensating delete.
/// - Implementations must not retry client errors; authorization problems
///   surface to the caller, which owns the session-termination decision.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Create an object, optionally under a parent folder.
    async fn create(
        &self,
        content: Bytes,
        name: &str,
        mime_type: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<UploadResult>;

    /// Grant "anyone with the link, reader" access to an object.
    async fn set_public_read_permission(&self, file_id: &str) -> Result<()>;

    /// Fetch metadata for a single object.
    async fn get(&self, file_id: &str) -> Result<FileInfo>;

    /// List objects, newest first.
    async fn list(&self, page_size: u32) -> Result<Vec<FileInfo>>;

    /// Delete an object. Returns `true` when the provider confirmed the
    /// deletion.
    async fn delete(&self, file_id: &str) -> Result<bool>;
}

/// Builds a [`FileStorage`] handle bound to one caller's access token.
///
/// Storage calls are authorized per request with the token the gate
/// decrypted, so the facade asks a factory for a fresh handle instead of
/// holding a long-lived one.
pub trait StorageFactory: Send + Sync {
    fn for_token(&self, access_token: &str) -> std::sync::Arc<dyn FileStorage>;
}
