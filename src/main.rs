use actix_web::{App, HttpServer, ResponseError, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use learnhub_backend::{
    AppError,
    config::Config,
    database::{create_pool, run_migrations},
    external::{PaymentGateway, StorageService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().map_err(|e| {
        log::error!("Failed to load configuration: {e}");
        std::io::Error::other(e.to_string())
    })?;

    let pool = create_pool(&config.database).await.map_err(|e| {
        log::error!("Failed to create database connection pool: {e}");
        std::io::Error::other(e.to_string())
    })?;

    run_migrations(&pool).await.map_err(|e| {
        log::error!("Failed to run database migrations: {e}");
        std::io::Error::other(e.to_string())
    })?;
    let pool = Arc::new(pool);

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let storage = StorageService::new(config.storage.clone());
    let gateway = PaymentGateway::new(config.payment.clone());
    log::info!(
        "Payment gateway: {} ({})",
        gateway.base_url(),
        if config.payment.is_production { "production" } else { "sandbox" }
    );

    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let user_service = UserService::new(pool.clone());
    let course_service = CourseService::new(pool.clone(), storage.clone());
    let chapter_service = ChapterService::new(pool.clone(), storage.clone());
    let quiz_service = QuizService::new(pool.clone());
    let enrollment_service = EnrollmentService::new(
        pool.clone(),
        gateway,
        config.server.public_base_url.clone(),
    );
    let certificate_service = CertificateService::new(pool.clone(), storage.clone());
    let upload_service = UploadService::new(pool.clone(), storage);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(course_service.clone()))
            .app_data(web::Data::new(chapter_service.clone()))
            .app_data(web::Data::new(quiz_service.clone()))
            .app_data(web::Data::new(enrollment_service.clone()))
            .app_data(web::Data::new(certificate_service.clone()))
            .app_data(web::Data::new(upload_service.clone()))
            .configure(swagger_config)
            .configure(handlers::pages_config)
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::profile_config)
                    .configure(handlers::course_config)
                    .configure(handlers::chapter_config)
                    .configure(handlers::quiz_config)
                    .configure(handlers::enrollment_config)
                    .configure(handlers::certificate_config)
                    .configure(handlers::upload_config),
            )
            .default_service(web::to(|| async {
                AppError::NotFound("Route not found".to_string()).error_response()
            }))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
