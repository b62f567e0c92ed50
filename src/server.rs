//! Server assembly
//!
//! Builds the middleware chain and mounts the routers, but never binds a
//! socket; the hosting entry point (or a test harness) drives the assembled
//! application.

use crate::handlers::{
    get_post, hello, list_posts, register_account, sign_in, validate_session,
};
use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::web;

/// Mount all routes onto a service config
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(hello))
        .service(
            web::scope("/user")
                .route("/register", web::post().to(register_account))
                .route("/sign-in", web::post().to(sign_in))
                .route("/validate-session", web::post().to(validate_session)),
        )
        .service(
            web::scope("/blog")
                .route("", web::get().to(list_posts))
                .route("/{id}", web::get().to(get_post)),
        );
}

/// Allow-list CORS: configured origins only
#[must_use]
pub fn build_cors(cors_origins: Vec<String>) -> Cors {
    Cors::default()
        .allowed_origin_fn(move |origin, _| {
            cors_origins
                .iter()
                .any(|allowed| allowed == origin.to_str().unwrap_or(""))
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
        .supports_credentials()
        .max_age(3600)
}

/// Baseline security headers on every response
#[must_use]
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Content-Security-Policy", "default-src 'self'"))
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("X-Permitted-Cross-Domain-Policies", "none"))
}
