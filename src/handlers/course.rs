use crate::middlewares::{current_user_id, optional_user_id};
use crate::models::*;
use crate::services::CourseService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "catalog",
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryResponse>)
    )
)]
pub async fn list_categories(course_service: web::Data<CourseService>) -> Result<HttpResponse> {
    match course_service.list_categories().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "catalog",
    request_body = CreateCategoryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Missing or duplicate name"),
        (status = 403, description = "Teacher profile required")
    )
)]
pub async fn create_category(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match course_service
        .create_category(user_id, request.into_inner())
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
    path = "/api/courses",
    tag = "catalog",
    params(CourseQuery),
    responses(
        (status = 200, description = "Published courses", body = PaginatedCourseResponse)
    )
)]
pub async fn list_courses(
    course_service: web::Data<CourseService>,
    query: web::Query<CourseQuery>,
) -> Result<HttpResponse> {
    match course_service.list_published(query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    tag = "catalog",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with chapter outline", body = CourseDetailResponse),
        (status = 404, description = "Course not found or not published")
    )
)]
pub async fn get_course(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let viewer = optional_user_id(&req);

    match course_service
        .get_course_detail(path.into_inner(), viewer)
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
    post,
    path = "/api/courses",
    tag = "catalog",
    request_body = CreateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Draft course created", body = CourseResponse),
        (status = 400, description = "Invalid title or price"),
        (status = 403, description = "Teacher profile required")
    )
)]
pub async fn create_course(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
    request: web::Json<CreateCourseRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match course_service
        .create_course(user_id, request.into_inner())
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
    path = "/api/courses/{course_id}",
    tag = "catalog",
    params(("course_id" = i64, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn update_course(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCourseRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match course_service
        .update_course(user_id, path.into_inner(), request.into_inner())
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
    delete,
    path = "/api/courses/{course_id}",
    tag = "catalog",
    params(("course_id" = i64, Path, description = "Course id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match course_service.delete_course(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Course deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/courses/{course_id}/publish",
    tag = "catalog",
    params(("course_id" = i64, Path, description = "Course id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course published", body = CourseResponse),
        (status = 400, description = "Course is missing a description or chapters"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn publish_course(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match course_service
        .set_published(user_id, path.into_inner(), true)
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
    post,
    path = "/api/courses/{course_id}/unpublish",
    tag = "catalog",
    params(("course_id" = i64, Path, description = "Course id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course moved back to draft", body = CourseResponse),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn unpublish_course(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match course_service
        .set_published(user_id, path.into_inner(), false)
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
    path = "/api/teacher/courses",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own courses including drafts", body = Vec<CourseResponse>),
        (status = 403, description = "Teacher profile required")
    )
)]
pub async fn list_teacher_courses(
    course_service: web::Data<CourseService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match course_service.list_teacher_courses(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn course_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/categories")
            .route(web::get().to(list_categories))
            .route(web::post().to(create_category)),
    )
    .service(
        web::resource("/courses")
            .route(web::get().to(list_courses))
            .route(web::post().to(create_course)),
    )
    .service(
        web::resource("/courses/{course_id}")
            .route(web::get().to(get_course))
            .route(web::patch().to(update_course))
            .route(web::delete().to(delete_course)),
    )
    .route("/courses/{course_id}/publish", web::post().to(publish_course))
    .route("/courses/{course_id}/unpublish", web::post().to(unpublish_course))
    .route("/teacher/courses", web::get().to(list_teacher_courses));
}
