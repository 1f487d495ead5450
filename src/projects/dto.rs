use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of POST /upload-file/:id — base64 file payload plus metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub file_name: String,
    pub mime_type: String,
    pub file_data: String,
}

/// Body of PATCH /asignUser/:projectId.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignUserRequest {
    pub user_id: Uuid,
}

/// Result payload for bulk project insertion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedCount {
    pub inserted_count: u64,
}
