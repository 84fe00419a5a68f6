//! Server side of the checkout and payment pages. Both sit behind the same
//! checkout guard and answer with a redirect whenever a precondition is missing.

use crate::middlewares::optional_user_id;
use crate::services::{EnrollmentService, PageOutcome};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, http::header, web};
use serde_json::json;

fn original_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string())
}

fn render(outcome: PageOutcome) -> HttpResponse {
    match outcome {
        PageOutcome::Redirect(location) => HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .finish(),
        PageOutcome::Render(page) => HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        })),
    }
}

#[utoipa::path(
    get,
    path = "/checkout/{course_id}",
    tag = "pages",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Checkout summary", body = crate::models::CheckoutPageResponse),
        (status = 302, description = "Sign-in, onboarding, catalog or course page")
    )
)]
pub async fn checkout_page(
    enrollment_service: web::Data<EnrollmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = optional_user_id(&req);

    match enrollment_service
        .checkout_page(user_id, path.into_inner(), &original_path(&req))
        .await
    {
        Ok(outcome) => Ok(render(outcome)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payment/{course_id}",
    tag = "pages",
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Payment summary with the open gateway transaction", body = crate::models::CheckoutPageResponse),
        (status = 302, description = "Sign-in, onboarding, catalog, checkout or course page")
    )
)]
pub async fn payment_page(
    enrollment_service: web::Data<EnrollmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = optional_user_id(&req);

    match enrollment_service
        .payment_page(user_id, path.into_inner(), &original_path(&req))
        .await
    {
        Ok(outcome) => Ok(render(outcome)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn pages_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/checkout/{course_id}", web::get().to(checkout_page))
        .route("/payment/{course_id}", web::get().to(payment_page));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentConfig;
    use crate::external::PaymentGateway;
    use crate::middlewares::AuthMiddleware;
    use crate::utils::JwtService;
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[actix_web::test]
    async fn test_checkout_without_session_redirects_to_signin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = EnrollmentService::new(
            std::sync::Arc::new(db),
            PaymentGateway::new(PaymentConfig::default()),
            "http://localhost:3000".to_string(),
        );

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(JwtService::new("test-secret", 60, 120)))
                .app_data(web::Data::new(service))
                .configure(pages_config),
        )
        .await;

        let req = test::TestRequest::get().uri("/checkout/12").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/auth/signin?callbackUrl=%2Fcheckout%2F12"
        );
    }
}
