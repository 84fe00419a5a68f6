use crate::external::PaymentNotification;
use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::EnrollmentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/enrollments/checkout",
    tag = "enrollments",
    request_body = CheckoutRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending enrollment with gateway token, or completed for a free course", body = CheckoutResponse),
        (status = 400, description = "Course already purchased"),
        (status = 403, description = "Student profile required"),
        (status = 404, description = "Course not found"),
        (status = 502, description = "Payment gateway error")
    )
)]
pub async fn checkout(
    enrollment_service: web::Data<EnrollmentService>,
    req: HttpRequest,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match enrollment_service
        .create_checkout(user_id, request.into_inner())
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
    path = "/api/check-payment-status",
    tag = "enrollments",
    params(PaymentStatusQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Locally stored enrollment status", body = PaymentStatusResponse),
        (status = 403, description = "Enrollment belongs to someone else"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn check_payment_status(
    enrollment_service: web::Data<EnrollmentService>,
    req: HttpRequest,
    query: web::Query<PaymentStatusQuery>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match enrollment_service
        .payment_status(user_id, query.enrollment_id)
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
    path = "/api/enrollments",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own enrollments", body = Vec<EnrollmentResponse>)
    )
)]
pub async fn list_enrollments(
    enrollment_service: web::Data<EnrollmentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match enrollment_service.list_my_enrollments(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/enrollments/{enrollment_id}/status",
    tag = "enrollments",
    params(("enrollment_id" = i64, Path, description = "Enrollment id")),
    request_body = UpdateEnrollmentStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = EnrollmentResponse),
        (status = 403, description = "Not the course's teacher"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn update_enrollment_status(
    enrollment_service: web::Data<EnrollmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateEnrollmentStatusRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match enrollment_service
        .update_status(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Gateway notification endpoint. Authenticated by the payload signature, not a session.
#[utoipa::path(
    post,
    path = "/api/payments/notification",
    tag = "enrollments",
    request_body = PaymentNotification,
    responses(
        (status = 200, description = "Notification applied", body = PaymentStatusResponse),
        (status = 403, description = "Invalid signature"),
        (status = 404, description = "Unknown order")
    )
)]
pub async fn payment_notification(
    enrollment_service: web::Data<EnrollmentService>,
    notification: web::Json<PaymentNotification>,
) -> Result<HttpResponse> {
    match enrollment_service
        .handle_notification(notification.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn enrollment_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/enrollments", web::get().to(list_enrollments))
        .route("/enrollments/checkout", web::post().to(checkout))
        .route(
            "/enrollments/{enrollment_id}/status",
            web::patch().to(update_enrollment_status),
        )
        .route("/check-payment-status", web::get().to(check_payment_status))
        .route("/payments/notification", web::post().to(payment_notification));
}
