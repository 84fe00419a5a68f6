use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::{UploadKind, UploadService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

async fn presign(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    kind: UploadKind,
    request: PresignRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match upload_service.presign(user_id, kind, request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/uploads/thumbnail",
    tag = "uploads",
    request_body = PresignRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Presigned PUT for a course thumbnail", body = PresignResponse),
        (status = 400, description = "Unsupported image type"),
        (status = 403, description = "Teacher profile required")
    )
)]
pub async fn presign_thumbnail(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    request: web::Json<PresignRequest>,
) -> Result<HttpResponse> {
    presign(upload_service, req, UploadKind::Thumbnail, request.into_inner()).await
}

#[utoipa::path(
    post,
    path = "/api/uploads/video",
    tag = "uploads",
    request_body = PresignRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Presigned PUT for a chapter video", body = PresignResponse),
        (status = 400, description = "Unsupported video type"),
        (status = 403, description = "Teacher profile required")
    )
)]
pub async fn presign_video(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    request: web::Json<PresignRequest>,
) -> Result<HttpResponse> {
    presign(upload_service, req, UploadKind::Video, request.into_inner()).await
}

pub fn upload_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/uploads")
            .route("/thumbnail", web::post().to(presign_thumbnail))
            .route("/video", web::post().to(presign_video)),
    );
}
