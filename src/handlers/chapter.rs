use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::ChapterService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/chapters",
    tag = "chapters",
    request_body = CreateChapterRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Chapter appended to the course", body = ChapterResponse),
        (status = 400, description = "title or courseId missing"),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_chapter(
    chapter_service: web::Data<ChapterService>,
    req: HttpRequest,
    request: web::Json<CreateChapterRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match chapter_service
        .create_chapter(user_id, request.into_inner())
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
    path = "/api/chapters/{chapter_id}",
    tag = "chapters",
    params(("chapter_id" = i64, Path, description = "Chapter id")),
    request_body = UpdateChapterRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Chapter updated", body = ChapterResponse),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Chapter not found")
    )
)]
pub async fn update_chapter(
    chapter_service: web::Data<ChapterService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateChapterRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match chapter_service
        .update_chapter(user_id, path.into_inner(), request.into_inner())
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
    path = "/api/chapters/{chapter_id}",
    tag = "chapters",
    params(("chapter_id" = i64, Path, description = "Chapter id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Chapter deleted and the rest renumbered"),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Chapter not found")
    )
)]
pub async fn delete_chapter(
    chapter_service: web::Data<ChapterService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match chapter_service
        .delete_chapter(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Chapter deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/courses/{course_id}/chapters/reorder",
    tag = "chapters",
    params(("course_id" = i64, Path, description = "Course id")),
    request_body = ReorderChaptersRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Chapters in their new order", body = Vec<ChapterResponse>),
        (status = 400, description = "Not a permutation of the course's chapters"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn reorder_chapters(
    chapter_service: web::Data<ChapterService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ReorderChaptersRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match chapter_service
        .reorder_chapters(user_id, path.into_inner(), request.into_inner())
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
    path = "/api/courses/{course_id}/chapters/{chapter_id}",
    tag = "chapters",
    params(
        ("course_id" = i64, Path, description = "Course id"),
        ("chapter_id" = i64, Path, description = "Chapter id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Chapter body with resources and quizzes", body = ChapterContentResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Chapter is locked"),
        (status = 404, description = "Course or chapter not found")
    )
)]
pub async fn get_chapter_content(
    chapter_service: web::Data<ChapterService>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let (course_id, chapter_id) = path.into_inner();

    match chapter_service
        .get_chapter_content(user_id, course_id, chapter_id)
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
    path = "/api/chapters/{chapter_id}/resources",
    tag = "chapters",
    params(("chapter_id" = i64, Path, description = "Chapter id")),
    request_body = CreateResourceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Resource attached", body = ResourceResponse),
        (status = 400, description = "Invalid name or url"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn add_resource(
    chapter_service: web::Data<ChapterService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CreateResourceRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match chapter_service
        .add_resource(user_id, path.into_inner(), request.into_inner())
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
    path = "/api/resources/{resource_id}",
    tag = "chapters",
    params(("resource_id" = i64, Path, description = "Resource id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Resource removed"),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn delete_resource(
    chapter_service: web::Data<ChapterService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match chapter_service
        .delete_resource(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Resource deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn chapter_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/chapters", web::post().to(create_chapter))
        .service(
            web::resource("/chapters/{chapter_id}")
                .route(web::patch().to(update_chapter))
                .route(web::delete().to(delete_chapter)),
        )
        .route("/chapters/{chapter_id}/resources", web::post().to(add_resource))
        .route("/resources/{resource_id}", web::delete().to(delete_resource))
        .route(
            "/courses/{course_id}/chapters/reorder",
            web::put().to(reorder_chapters),
        )
        .route(
            "/courses/{course_id}/chapters/{chapter_id}",
            web::get().to(get_chapter_content),
        );
}
