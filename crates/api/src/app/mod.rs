//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: infrastructure wiring (stores, domain services, realtime channel)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post, put},
};
use tower::ServiceBuilder;

use skillbridge_auth::Hs256Jwt;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let jwt = Arc::new(Hs256Jwt::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt: jwt.clone() };

    let services = Arc::new(services::build_services(jwt).await);

    // Protected routes: require a valid bearer token.
    let protected = Router::new()
        .route("/api/auth/verify", get(routes::auth::verify))
        .route("/api/auth/profile", put(routes::auth::update_profile))
        .route("/api/events", post(routes::events::create_event))
        .route(
            "/api/events/:id",
            put(routes::events::update_event).delete(routes::events::delete_event),
        )
        .route(
            "/api/events/:id/register",
            post(routes::events::register).delete(routes::events::cancel_registration),
        )
        .route("/api/events/user/me", get(routes::events::user_events))
        .route("/api/stream", get(routes::system::stream))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/", get(routes::system::welcome))
        .route("/health", get(routes::system::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/events", get(routes::events::list_events))
        .route("/api/events/:id", get(routes::events::get_event))
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
