//! Google Drive API connector implementation
//!
//! Implements the `FileStorage` trait for Google Drive API v3. Every call
//! is authorized with the access token supplied at construction: the token
//! the authentication gate decrypted for the current request, never a fixed
//! service identity.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::storage::{FileInfo, FileStorage, UploadResult};
use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{DriveFile, FilesListResponse, PermissionRequest, UploadMetadata};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive upload endpoint base URL
const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,webViewLink,webContentLink,mimeType,size,createdTime";

/// Google Drive API connector
///
/// Constructed per request from the caller's decrypted token bundle.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::DriveConnector;
/// use bridge_traits::storage::FileStorage;
///
/// let connector = DriveConnector::new(http_client, access_token);
/// let result = connector.create(bytes, "image_1_x.png", "image/png", None).await?;
/// connector.set_public_read_permission(&result.file_id).await?;
/// ```
pub struct DriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token of the calling user
    access_token: String,
}

impl DriveConnector {
    /// Create a new Google Drive connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with `drive.file` scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Assemble a `multipart/related` body: a JSON metadata part followed by
    /// the media part, as the Drive upload endpoint expects.
    fn multipart_body(
        boundary: &str,
        metadata: &UploadMetadata,
        mime_type: &str,
        content: &Bytes,
    ) -> std::result::Result<Vec<u8>, GoogleDriveError> {
        let metadata_json = serde_json::to_string(metadata)
            .map_err(|e| GoogleDriveError::ParseError(format!("metadata serialization: {}", e)))?;

        let mut body = Vec::with_capacity(content.len() + metadata_json.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata_json.as_bytes());
        body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Ok(body)
    }

    fn random_boundary() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        format!("galeria_boundary_{}", suffix)
    }

    fn check_status(response: &HttpResponse) -> std::result::Result<(), GoogleDriveError> {
        if response.is_success() {
            return Ok(());
        }
        warn!(status = response.status, "Drive API request failed");
        Err(GoogleDriveError::ApiError {
            status_code: response.status,
            message: String::from_utf8_lossy(&response.body).to_string(),
        })
    }

    fn parse_file(response: &HttpResponse) -> std::result::Result<DriveFile, GoogleDriveError> {
        serde_json::from_slice(&response.body)
            .map_err(|e| GoogleDriveError::ParseError(format!("file resource: {}", e)))
    }
}

/// Builds per-request [`DriveConnector`]s bound to a caller's access token.
pub struct DriveStorageFactory {
    http_client: Arc<dyn HttpClient>,
}

impl DriveStorageFactory {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }
}

impl bridge_traits::storage::StorageFactory for DriveStorageFactory {
    fn for_token(&self, access_token: &str) -> Arc<dyn FileStorage> {
        Arc::new(DriveConnector::new(self.http_client.clone(), access_token))
    }
}

#[async_trait]
impl FileStorage for DriveConnector {
    #[instrument(skip(self, content), fields(name = %name, size = content.len()))]
    async fn create(
        &self,
        content: Bytes,
        name: &str,
        mime_type: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<UploadResult> {
        info!("Uploading file to Google Drive");

        let metadata = UploadMetadata {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parents: parent_folder_id.map(|id| vec![id.to_string()]).unwrap_or_default(),
        };

        let boundary = Self::random_boundary();
        let body = Self::multipart_body(&boundary, &metadata, mime_type, &content)?;

        let url = format!(
            "{}/files?uploadType=multipart&fields={}",
            UPLOAD_API_BASE, FILE_FIELDS
        );

        let request = HttpRequest::new(HttpMethod::Post, url)
            .header("Authorization", self.auth_header())
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", boundary),
            )
            .body(Bytes::from(body));

        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;

        let file = Self::parse_file(&response)?;
        info!(file_id = %file.id, "Uploaded file");

        Ok(file.into())
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn set_public_read_permission(&self, file_id: &str) -> Result<()> {
        debug!("Granting public read permission");

        let url = format!("{}/files/{}/permissions", DRIVE_API_BASE, file_id);

        let request = HttpRequest::new(HttpMethod::Post, url)
            .header("Authorization", self.auth_header())
            .json(&PermissionRequest::anyone_reader())?;

        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;

        info!(file_id = %file_id, "File is publicly readable");
        Ok(())
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn get(&self, file_id: &str) -> Result<FileInfo> {
        let url = format!(
            "{}/files/{}?fields={}",
            DRIVE_API_BASE,
            urlencoding::encode(file_id),
            FILE_FIELDS
        );

        let request =
            HttpRequest::new(HttpMethod::Get, url).header("Authorization", self.auth_header());

        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;

        let file = Self::parse_file(&response)?;
        Ok(file.into())
    }

    #[instrument(skip(self))]
    async fn list(&self, page_size: u32) -> Result<Vec<FileInfo>> {
        let url = format!(
            "{}/files?pageSize={}&orderBy={}&fields=nextPageToken,files({})",
            DRIVE_API_BASE,
            page_size,
            urlencoding::encode("createdTime desc"),
            FILE_FIELDS
        );

        let request =
            HttpRequest::new(HttpMethod::Get, url).header("Authorization", self.auth_header());

        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;

        let list: FilesListResponse = serde_json::from_slice(&response.body)
            .map_err(|e| GoogleDriveError::ParseError(format!("files list: {}", e)))?;

        debug!(count = list.files.len(), "Listed files");

        Ok(list.files.into_iter().map(FileInfo::from).collect())
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn delete(&self, file_id: &str) -> Result<bool> {
        let url = format!(
            "{}/files/{}",
            DRIVE_API_BASE,
            urlencoding::encode(file_id)
        );

        let request =
            HttpRequest::new(HttpMethod::Delete, url).header("Authorization", self.auth_header());

        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;

        info!(file_id = %file_id, "Deleted file");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::http::RetryPolicy;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    const FILE_JSON: &str = r#"{
        "id": "file1",
        "name": "image_1_x.png",
        "mimeType": "image/png",
        "webViewLink": "https://drive.google.com/file/d/file1/view",
        "webContentLink": "https://drive.google.com/uc?id=file1",
        "size": "2048"
    }"#;

    #[tokio::test]
    async fn test_create_sends_multipart_request() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.starts_with(UPLOAD_API_BASE));
            assert!(request.url.contains("uploadType=multipart"));
            assert_eq!(
                request.headers.get("Authorization"),
                Some(&"Bearer test_token".to_string())
            );
            let content_type = request.headers.get("Content-Type").unwrap();
            assert!(content_type.starts_with("multipart/related; boundary="));

            let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
            assert!(body.contains(r#""name":"image_1_x.png""#));
            assert!(body.contains(r#""mimeType":"image/png""#));
            assert!(body.contains(r#""parents":["folder1"]"#));
            assert!(body.contains("Content-Type: image/png"));

            Ok(response(200, FILE_JSON))
        });

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        let result = connector
            .create(
                Bytes::from(vec![1, 2, 3]),
                "image_1_x.png",
                "image/png",
                Some("folder1"),
            )
            .await
            .unwrap();

        assert_eq!(result.file_id, "file1");
        assert_eq!(result.size, Some("2048".to_string()));
    }

    #[tokio::test]
    async fn test_create_without_parent_omits_parents() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
            assert!(!body.contains("parents"));
            Ok(response(200, FILE_JSON))
        });

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        connector
            .create(Bytes::from(vec![1]), "image_1_x.png", "image/png", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_public_read_permission() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.ends_with("/files/file1/permissions"));
            let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
            assert_eq!(body, r#"{"role":"reader","type":"anyone"}"#);

            Ok(response(200, r#"{"id": "perm1"}"#))
        });

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        connector.set_public_read_permission("file1").await.unwrap();
    }

    #[tokio::test]
    async fn test_permission_failure_propagates() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(403, "insufficient permissions")));

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        let result = connector.set_public_read_permission("file1").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_metadata() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.contains("/files/file1?fields="));
            Ok(response(200, FILE_JSON))
        });

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        let info = connector.get("file1").await.unwrap();

        assert_eq!(info.id, "file1");
        assert_eq!(info.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.contains("pageSize=10"));
            assert!(request.url.contains("orderBy=createdTime%20desc"));

            Ok(response(
                200,
                r#"{"files": [
                    {"id": "f1", "name": "a.png", "mimeType": "image/png"},
                    {"id": "f2", "name": "b.png", "mimeType": "image/png"}
                ]}"#,
            ))
        });

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        let files = connector.list(10).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, "f1");
    }

    #[tokio::test]
    async fn test_delete_success() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert_eq!(request.method, HttpMethod::Delete);
            assert!(request.url.ends_with("/files/file1"));
            Ok(response(204, ""))
        });

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        assert!(connector.delete("file1").await.unwrap());
    }

    #[tokio::test]
    async fn test_api_error_handling() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(404, "File not found")));

        let connector = DriveConnector::new(Arc::new(http), "test_token");
        let result = connector.get("nonexistent").await;

        assert!(result.is_err());
    }

    #[test]
    fn test_multipart_body_layout() {
        let metadata = UploadMetadata {
            name: "image.png".to_string(),
            mime_type: "image/png".to_string(),
            parents: vec![],
        };
        let body = DriveConnector::multipart_body(
            "test_boundary",
            &metadata,
            "image/png",
            &Bytes::from(vec![0xAA, 0xBB]),
        )
        .unwrap();

        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with("--test_boundary\r\n"));
        assert!(text.contains("Content-Type: application/json; charset=UTF-8"));
        assert!(text.ends_with("\r\n--test_boundary--\r\n"));
    }

    #[test]
    fn test_boundaries_are_unique() {
        assert_ne!(
            DriveConnector::random_boundary(),
            DriveConnector::random_boundary()
        );
    }
}
