use crate::error::{AppError, AppResult};
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user id stored in the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

// Routes reachable without a session. A valid token is still attached when present.
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // anonymous reads only
    get_prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/payments/notification",
            ],
            prefix_paths: vec![
                "/swagger-ui/",
                "/api-docs/",
                "/api/auth/",
                // page routes redirect to sign-in themselves
                "/checkout/",
                "/payment/",
            ],
            get_prefix_paths: vec!["/api/courses", "/api/categories"],
        }
    }

    fn is_public_path(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }
        method == Method::GET
            && self
                .get_prefix_paths
                .iter()
                .any(|&prefix| path.starts_with(prefix))
    }
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        req.cookie(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
    })
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let is_public = self.public_paths.is_public_path(req.method(), req.path());
        let verified = extract_token(&req).map(|token| {
            self.jwt_service
                .verify_access_token(&token)
                .and_then(|claims| claims.user_id())
        });

        match verified {
            Some(Ok(user_id)) => {
                req.extensions_mut().insert(CurrentUser(user_id));
                Box::pin(self.service.call(req))
            }
            _ if is_public => Box::pin(self.service.call(req)),
            Some(Err(_)) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// User id attached by [`AuthMiddleware`], if any.
pub fn optional_user_id(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<CurrentUser>().map(|u| u.0)
}

/// Same as [`optional_user_id`] but a missing session is a 401.
pub fn current_user_id(req: &HttpRequest) -> AppResult<i64> {
    optional_user_id(req).ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test as actix_test, web};

    async fn whoami(req: HttpRequest) -> actix_web::Result<HttpResponse> {
        let user_id = current_user_id(&req)?;
        Ok(HttpResponse::Ok().body(user_id.to_string()))
    }

    async fn maybe(req: HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body(format!("{:?}", optional_user_id(&req)))
    }

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 60, 120)
    }

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path(&Method::POST, "/api/auth/login"));
        assert!(paths.is_public_path(&Method::GET, "/api/courses/3"));
        assert!(!paths.is_public_path(&Method::POST, "/api/courses"));
        assert!(paths.is_public_path(&Method::GET, "/checkout/3"));
        assert!(paths.is_public_path(&Method::POST, "/api/payments/notification"));
        assert!(!paths.is_public_path(&Method::GET, "/api/me"));
    }

    #[actix_web::test]
    async fn test_protected_route_without_token_is_unauthorized() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/me", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/me").to_request();
        let err = actix_test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_bearer_and_cookie_tokens_are_accepted() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/me", web::get().to(whoami)),
        )
        .await;
        let token = jwt().generate_access_token(7, "ada@example.com").unwrap();

        let req = actix_test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"7"));

        let req = actix_test::TestRequest::get()
            .uri("/api/me")
            .cookie(actix_web::cookie::Cookie::new(ACCESS_TOKEN_COOKIE, token))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"7"));
    }

    #[actix_web::test]
    async fn test_public_route_ignores_bad_token() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/checkout/{id}", web::get().to(maybe)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/checkout/5")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"None"));
    }
}
