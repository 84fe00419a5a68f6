use crate::middlewares::auth::ACCESS_TOKEN_COOKIE;
use crate::models::*;
use crate::services::AuthService;
use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Session cookie read by the page routes, which cannot send a bearer header.
fn session_cookie(auth: &AuthResponse) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, auth.access_token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(auth.expires_in))
        .finish()
}

fn signed_in(response: AuthResponse) -> HttpResponse {
    HttpResponse::Ok().cookie(session_cookie(&response)).json(json!({
        "success": true,
        "data": response
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match auth_service.register(request.into_inner()).await {
        Ok(response) => Ok(signed_in(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(signed_in(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = AuthResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh_token(&request.refresh_token).await {
        Ok(response) => Ok(signed_in(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> Result<HttpResponse> {
    // tokens are stateless; dropping the cookie ends the browser session
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Signed out"
    })))
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_logout_expires_session_cookie() {
        let app = test::init_service(App::new().configure(auth_config)).await;

        let req = test::TestRequest::post().uri("/auth/logout").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
            .unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
