use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::EnrollmentStatus;
use crate::external::PaymentNotification;
use crate::handlers;
use crate::models::*;
use crate::utils::PaginationInfo;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::profile::me,
        handlers::profile::create_student_profile,
        handlers::profile::create_teacher_profile,
        handlers::profile::update_profile,
        handlers::course::list_categories,
        handlers::course::create_category,
        handlers::course::list_courses,
        handlers::course::get_course,
        handlers::course::create_course,
        handlers::course::update_course,
        handlers::course::delete_course,
        handlers::course::publish_course,
        handlers::course::unpublish_course,
        handlers::course::list_teacher_courses,
        handlers::chapter::create_chapter,
        handlers::chapter::update_chapter,
        handlers::chapter::delete_chapter,
        handlers::chapter::reorder_chapters,
        handlers::chapter::get_chapter_content,
        handlers::chapter::add_resource,
        handlers::chapter::delete_resource,
        handlers::quiz::create_quiz,
        handlers::quiz::get_quiz,
        handlers::quiz::update_quiz,
        handlers::quiz::delete_quiz,
        handlers::quiz::submit_quiz,
        handlers::quiz::create_question,
        handlers::quiz::update_question,
        handlers::quiz::delete_question,
        handlers::enrollment::checkout,
        handlers::enrollment::check_payment_status,
        handlers::enrollment::list_enrollments,
        handlers::enrollment::update_enrollment_status,
        handlers::enrollment::payment_notification,
        handlers::certificate::issue_certificate,
        handlers::certificate::list_certificates,
        handlers::certificate::get_certificate,
        handlers::certificate::regenerate_certificate,
        handlers::upload::presign_thumbnail,
        handlers::upload::presign_video,
        handlers::pages::checkout_page,
        handlers::pages::payment_page,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            UserResponse,
            AuthResponse,
            Role,
            MeResponse,
            StudentProfileResponse,
            TeacherProfileResponse,
            CreateTeacherProfileRequest,
            UpdateProfileRequest,
            CategoryResponse,
            CreateCategoryRequest,
            CourseQuery,
            CreateCourseRequest,
            UpdateCourseRequest,
            CourseResponse,
            ChapterOutline,
            CourseDetailResponse,
            PaginatedCourseResponse,
            PaginationInfo,
            CreateChapterRequest,
            UpdateChapterRequest,
            ReorderChaptersRequest,
            ChapterResponse,
            ResourceResponse,
            CreateResourceRequest,
            ChapterContentResponse,
            QuizSummary,
            CreateQuizRequest,
            UpdateQuizRequest,
            OptionInput,
            CreateQuestionRequest,
            UpdateQuestionRequest,
            OptionResponse,
            QuestionResponse,
            QuizResponse,
            AnswerInput,
            SubmitQuizRequest,
            QuestionResult,
            QuizResultResponse,
            EnrollmentStatus,
            CheckoutRequest,
            CheckoutResponse,
            PaymentStatusResponse,
            UpdateEnrollmentStatusRequest,
            EnrollmentResponse,
            CheckoutPageResponse,
            PaymentNotification,
            IssueCertificateRequest,
            CertificateResponse,
            PresignRequest,
            PresignResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and tokens"),
        (name = "profile", description = "Current user and role profiles"),
        (name = "catalog", description = "Categories and courses"),
        (name = "chapters", description = "Chapter authoring and content"),
        (name = "quizzes", description = "Quiz authoring and grading"),
        (name = "enrollments", description = "Checkout, payment status and gateway notifications"),
        (name = "certificates", description = "Completion certificates"),
        (name = "uploads", description = "Presigned object storage uploads"),
        (name = "pages", description = "Checkout and payment page guards"),
    ),
    info(
        title = "LearnHub API",
        version = "1.0.0",
        description = "LearnHub e-learning backend REST API"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/me"));
        assert!(paths.contains_key("/api/check-payment-status"));
        assert!(paths.contains_key("/checkout/{course_id}"));
        assert!(doc.components.is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
