use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::CertificateService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/certificates",
    tag = "certificates",
    request_body = IssueCertificateRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Issued certificate, or the existing one", body = CertificateResponse),
        (status = 403, description = "No completed enrollment for the course")
    )
)]
pub async fn issue_certificate(
    certificate_service: web::Data<CertificateService>,
    req: HttpRequest,
    request: web::Json<IssueCertificateRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match certificate_service
        .issue(user_id, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/certificates",
    tag = "certificates",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own certificates", body = Vec<CertificateResponse>),
        (status = 403, description = "Student profile required")
    )
)]
pub async fn list_certificates(
    certificate_service: web::Data<CertificateService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match certificate_service.list(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/certificates/{certificate_id}",
    tag = "certificates",
    params(("certificate_id" = i64, Path, description = "Certificate id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Certificate", body = CertificateResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn get_certificate(
    certificate_service: web::Data<CertificateService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match certificate_service.get(user_id, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/certificates/{certificate_id}/regenerate",
    tag = "certificates",
    params(("certificate_id" = i64, Path, description = "Certificate id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "PDF re-rendered, URL replaced", body = CertificateResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn regenerate_certificate(
    certificate_service: web::Data<CertificateService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match certificate_service
        .regenerate(user_id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn certificate_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/certificates")
            .route("", web::post().to(issue_certificate))
            .route("", web::get().to(list_certificates))
            .route("/{certificate_id}", web::get().to(get_certificate))
            .route(
                "/{certificate_id}/regenerate",
                web::post().to(regenerate_certificate),
            ),
    );
}
