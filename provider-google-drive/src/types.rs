//! Google Drive API response types
//!
//! Data structures for deserializing Google Drive API v3 responses.

use bridge_traits::storage::{FileInfo, UploadResult};
use serde::{Deserialize, Serialize};

/// Google Drive API file resource, restricted to the fields this service
/// requests.
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// Browser-facing link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,

    /// Direct-download link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,

    /// File size in bytes (string-typed on the wire, omitted for folders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Creation time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl From<DriveFile> for UploadResult {
    fn from(file: DriveFile) -> Self {
        UploadResult {
            file_id: file.id,
            file_name: file.name,
            web_view_link: file.web_view_link.unwrap_or_default(),
            web_content_link: file.web_content_link.unwrap_or_default(),
            mime_type: file.mime_type,
            size: file.size,
        }
    }
}

impl From<DriveFile> for FileInfo {
    fn from(file: DriveFile) -> Self {
        FileInfo {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            web_view_link: file.web_view_link.unwrap_or_default(),
            web_content_link: file.web_content_link.unwrap_or_default(),
            size: file.size,
            created_time: file.created_time,
        }
    }
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// List of files
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for next page
    pub next_page_token: Option<String>,
}

/// Metadata part of a multipart upload request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub name: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

/// Body of a permissions.create call.
#[derive(Debug, Serialize)]
pub struct PermissionRequest {
    pub role: &'static str,
    #[serde(rename = "type")]
    pub grantee_type: &'static str,
}

impl PermissionRequest {
    /// "Anyone with the link, reader", the grant that makes an uploaded
    /// object publicly viewable.
    pub fn anyone_reader() -> Self {
        Self {
            role: "reader",
            grantee_type: "anyone",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_drive_file() {
        let json = r#"{
            "id": "abc123",
            "name": "image_1_x.png",
            "mimeType": "image/png",
            "webViewLink": "https://drive.google.com/file/d/abc123/view",
            "webContentLink": "https://drive.google.com/uc?id=abc123",
            "size": "1024",
            "createdTime": "2023-01-01T00:00:00.000Z"
        }"#;

        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "abc123");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size, Some("1024".to_string()));
    }

    #[test]
    fn test_upload_result_conversion() {
        let file = DriveFile {
            id: "abc123".to_string(),
            name: "image_1_x.png".to_string(),
            mime_type: "image/png".to_string(),
            web_view_link: Some("https://drive.google.com/file/d/abc123/view".to_string()),
            web_content_link: None,
            size: Some("1024".to_string()),
            created_time: None,
        };

        let result: UploadResult = file.into();
        assert_eq!(result.file_id, "abc123");
        assert_eq!(result.web_content_link, "");
    }

    #[test]
    fn test_deserialize_files_list_response() {
        let json = r#"{
            "files": [
                {
                    "id": "file1",
                    "name": "image_1_a.png",
                    "mimeType": "image/png",
                    "webViewLink": "https://example.com/view"
                }
            ],
            "nextPageToken": "token123"
        }"#;

        let response: FilesListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.next_page_token, Some("token123".to_string()));
    }

    #[test]
    fn test_upload_metadata_omits_empty_parents() {
        let metadata = UploadMetadata {
            name: "image.png".to_string(),
            mime_type: "image/png".to_string(),
            parents: vec![],
        };

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(!json.contains("parents"));
        assert!(json.contains("mimeType"));
    }

    #[test]
    fn test_permission_request_shape() {
        let json = serde_json::to_string(&PermissionRequest::anyone_reader()).unwrap();
        assert_eq!(json, r#"{"role":"reader","type":"anyone"}"#);
    }
}
