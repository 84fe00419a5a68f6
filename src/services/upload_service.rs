use crate::error::{AppError, AppResult};
use crate::external::{PRESIGN_EXPIRES_IN, StorageService};
use crate::models::{PresignRequest, PresignResponse};
use crate::services::access::require_teacher;
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Thumbnail,
    Video,
}

impl UploadKind {
    pub fn prefix(self) -> &'static str {
        match self {
            UploadKind::Thumbnail => "thumbnails",
            UploadKind::Video => "videos",
        }
    }

    /// File extension for an allowed MIME type, `None` when the type is not accepted.
    pub fn extension_for(self, content_type: &str) -> Option<&'static str> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match (self, mime.as_str()) {
            (UploadKind::Thumbnail, "image/jpeg") => Some("jpg"),
            (UploadKind::Thumbnail, "image/png") => Some("png"),
            (UploadKind::Thumbnail, "image/webp") => Some("webp"),
            (UploadKind::Video, "video/mp4") => Some("mp4"),
            (UploadKind::Video, "video/webm") => Some("webm"),
            (UploadKind::Video, "video/quicktime") => Some("mov"),
            _ => None,
        }
    }
}

/// `<prefix>/<uuid>.<ext>`
pub fn object_key(kind: UploadKind, extension: &str) -> String {
    format!("{}/{}.{}", kind.prefix(), Uuid::new_v4(), extension)
}

#[derive(Clone)]
pub struct UploadService {
    pool: Arc<DatabaseConnection>,
    storage: StorageService,
}

impl UploadService {
    pub fn new(pool: Arc<DatabaseConnection>, storage: StorageService) -> Self {
        Self { pool, storage }
    }

    pub async fn presign(
        &self,
        user_id: i64,
        kind: UploadKind,
        request: PresignRequest,
    ) -> AppResult<PresignResponse> {
        let extension = kind.extension_for(&request.content_type).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Unsupported content type for {}: {}",
                kind.prefix(),
                request.content_type
            ))
        })?;
        require_teacher(self.pool.as_ref(), user_id).await?;

        let key = object_key(kind, extension);
        let upload_url = self.storage.presign_put(&key)?;
        let public_url = self.storage.public_url(&key);

        log::info!("Presigned upload issued: user_id={user_id}, key={key}");

        Ok(PresignResponse {
            key,
            upload_url,
            public_url,
            expires_in: PRESIGN_EXPIRES_IN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::entities::teacher_profile_entity as teacher;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn storage() -> StorageService {
        StorageService::new(StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            bucket: "learnhub".to_string(),
            access_key: "minio".to_string(),
            secret_key: "minio123".to_string(),
        })
    }

    fn request(content_type: &str) -> PresignRequest {
        PresignRequest {
            content_type: content_type.to_string(),
        }
    }

    #[test]
    fn test_allow_lists() {
        assert_eq!(UploadKind::Thumbnail.extension_for("image/png"), Some("png"));
        assert_eq!(UploadKind::Thumbnail.extension_for("IMAGE/JPEG"), Some("jpg"));
        assert_eq!(UploadKind::Thumbnail.extension_for("image/gif"), None);
        assert_eq!(UploadKind::Thumbnail.extension_for("video/mp4"), None);
        assert_eq!(UploadKind::Video.extension_for("video/quicktime"), Some("mov"));
        assert_eq!(
            UploadKind::Video.extension_for("video/webm; codecs=vp9"),
            Some("webm")
        );
    }

    #[actix_web::test]
    async fn test_unsupported_thumbnail_type_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = UploadService::new(Arc::new(db), storage());

        let result = service
            .presign(1, UploadKind::Thumbnail, request("application/x-msdownload"))
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_supported_thumbnail_type_is_presigned() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![teacher::Model {
                id: 2,
                user_id: 1,
                bio: None,
                expertise: None,
                created_at: None,
                updated_at: None,
            }]])
            .into_connection();
        let service = UploadService::new(Arc::new(db), storage());

        let response = service
            .presign(1, UploadKind::Thumbnail, request("image/webp"))
            .await
            .unwrap();

        assert!(response.key.starts_with("thumbnails/"));
        assert!(response.key.ends_with(".webp"));
        assert_eq!(response.expires_in, 300);
        assert_eq!(
            response.public_url,
            format!("http://localhost:9000/learnhub/{}", response.key)
        );
        assert!(response
            .upload_url
            .starts_with(&format!("http://localhost:9000/learnhub/{}?", response.key)));
        assert!(response.upload_url.contains("X-Amz-Expires=300"));
        assert!(response.upload_url.contains("X-Amz-Signature="));
    }
}
