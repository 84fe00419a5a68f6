use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user and derived role", body = MeResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me(user_service: web::Data<UserService>, req: HttpRequest) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service.me(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/profile/student",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Student profile", body = StudentProfileResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_student_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service.create_student_profile(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/profile/teacher",
    tag = "profile",
    request_body = CreateTeacherProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Teacher profile", body = TeacherProfileResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_teacher_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<CreateTeacherProfileRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service
        .create_teacher_profile(user_id, request.into_inner())
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
    patch,
    path = "/api/profile",
    tag = "profile",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated profile", body = MeResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Teacher fields without a teacher profile")
    )
)]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service.update_profile(user_id, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn profile_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(me)).service(
        web::scope("/profile")
            .route("", web::patch().to(update_profile))
            .route("/student", web::post().to(create_student_profile))
            .route("/teacher", web::post().to(create_teacher_profile)),
    );
}
