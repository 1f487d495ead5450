use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{response::ApiError, state::AppState, storage::UPLOAD_PREFIX};

use super::{
    dto::UploadFileRequest,
    repo::{self, Attachment},
};

/// Upload one file to the object store and append its reference to the
/// project. The project is checked first so a miss never creates an orphaned
/// stored object.
pub async fn attach_file(
    state: &AppState,
    project_id: Uuid,
    req: UploadFileRequest,
) -> Result<Attachment, ApiError> {
    if req.file_name.trim().is_empty() || req.mime_type.trim().is_empty() || req.file_data.is_empty()
    {
        return Err(ApiError::Validation(
            "File data is missing. Ensure you send fileName, mimeType, and fileData.".into(),
        ));
    }

    let bytes = BASE64
        .decode(req.file_data.as_bytes())
        .map_err(|_| ApiError::Validation("fileData is not valid base64".into()))?;

    if repo::find_by_id(&state.db, project_id).await?.is_none() {
        warn!(%project_id, "upload to unknown project");
        return Err(ApiError::NotFound("Project not found".into()));
    }

    let key = object_key(&req.file_name);
    let stored = state
        .storage
        .upload(&key, Bytes::from(bytes), &req.mime_type)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let attachment = Attachment {
        file_name: req.file_name,
        web_view_link: stored.web_view_link,
        downloadable_link: stored.downloadable_link,
    };

    let appended = repo::append_attachment(&state.db, project_id, &attachment).await?;
    if !appended {
        return Err(ApiError::NotFound("Project not found".into()));
    }

    info!(%project_id, file = %attachment.file_name, "attachment stored");
    Ok(attachment)
}

/// Object key under the fixed upload prefix. A random component keeps
/// same-named files from clobbering each other.
fn object_key(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{}/{}-{}", UPLOAD_PREFIX, Uuid::new_v4(), safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(file_name: &str, mime: &str, data: &str) -> UploadFileRequest {
        UploadFileRequest {
            file_name: file_name.into(),
            mime_type: mime.into(),
            file_data: data.into(),
        }
    }

    #[tokio::test]
    async fn rejects_missing_file_fields() {
        let state = AppState::fake();
        let id = Uuid::new_v4();

        for bad in [
            req("", "application/pdf", "aGk="),
            req("plan.pdf", "", "aGk="),
            req("plan.pdf", "application/pdf", ""),
        ] {
            let err = attach_file(&state, id, bad).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn rejects_invalid_base64() {
        let state = AppState::fake();
        let err = attach_file(
            &state,
            Uuid::new_v4(),
            req("plan.pdf", "application/pdf", "!!not-base64!!"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn object_keys_stay_under_upload_prefix() {
        let key = object_key("q3 report (final).pdf");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("q3-report--final-.pdf"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn object_keys_differ_for_same_name() {
        assert_ne!(object_key("a.pdf"), object_key("a.pdf"));
    }
}
