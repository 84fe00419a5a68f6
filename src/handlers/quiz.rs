use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::QuizService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/quizzes",
    tag = "quizzes",
    request_body = CreateQuizRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quiz created", body = QuizSummary),
        (status = 400, description = "chapterId or title missing"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn create_quiz(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    request: web::Json<CreateQuizRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service.create_quiz(user_id, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}",
    tag = "quizzes",
    params(("quiz_id" = i64, Path, description = "Quiz id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quiz with questions; answers only for the owner", body = QuizResponse),
        (status = 403, description = "Chapter is locked"),
        (status = 404, description = "Quiz not found")
    )
)]
pub async fn get_quiz(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service.get_quiz(user_id, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/quizzes/{quiz_id}",
    tag = "quizzes",
    params(("quiz_id" = i64, Path, description = "Quiz id")),
    request_body = UpdateQuizRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quiz renamed", body = QuizSummary),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn update_quiz(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateQuizRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service
        .update_quiz(user_id, path.into_inner(), request.into_inner())
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
    path = "/api/quizzes/{quiz_id}",
    tag = "quizzes",
    params(("quiz_id" = i64, Path, description = "Quiz id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quiz deleted"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn delete_quiz(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service.delete_quiz(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Quiz deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/quizzes/{quiz_id}/submit",
    tag = "quizzes",
    params(("quiz_id" = i64, Path, description = "Quiz id")),
    request_body = SubmitQuizRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Graded result, not stored", body = QuizResultResponse),
        (status = 403, description = "Chapter is locked")
    )
)]
pub async fn submit_quiz(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<SubmitQuizRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service
        .submit_quiz(user_id, path.into_inner(), request.into_inner())
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
    path = "/api/questions",
    tag = "quizzes",
    request_body = CreateQuestionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Question appended", body = QuestionResponse),
        (status = 400, description = "Needs two or more options with exactly one correct"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn create_question(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    request: web::Json<CreateQuestionRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service
        .create_question(user_id, request.into_inner())
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
    path = "/api/questions/{question_id}",
    tag = "quizzes",
    params(("question_id" = i64, Path, description = "Question id")),
    request_body = UpdateQuestionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 400, description = "Invalid option set"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn update_question(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateQuestionRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service
        .update_question(user_id, path.into_inner(), request.into_inner())
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
    path = "/api/questions/{question_id}",
    tag = "quizzes",
    params(("question_id" = i64, Path, description = "Question id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Question deleted"),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn delete_question(
    quiz_service: web::Data<QuizService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match quiz_service
        .delete_question(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Question deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn quiz_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/quizzes", web::post().to(create_quiz))
        .service(
            web::resource("/quizzes/{quiz_id}")
                .route(web::get().to(get_quiz))
                .route(web::patch().to(update_quiz))
                .route(web::delete().to(delete_quiz)),
        )
        .route("/quizzes/{quiz_id}/submit", web::post().to(submit_quiz))
        .route("/questions", web::post().to(create_question))
        .service(
            web::resource("/questions/{question_id}")
                .route(web::patch().to(update_question))
                .route(web::delete().to(delete_question)),
        );
}
