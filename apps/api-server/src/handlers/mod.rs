//! HTTP handlers and route configuration.

#[cfg(test)]
#[macro_use]
mod test_support;

mod auth;
mod health;
mod posts;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Every posts route requires an Identity
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    );
}

/// JSON extractor config: unreadable bodies become `400 {msg}`; parser
/// detail stays in the logs.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        AppError::BadRequest("Invalid request body".to_string()).into()
    })
}
