use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services.auth.register(body.into_new_user()).await {
        Ok((token, user)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "registration successful",
                "token": token,
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.auth.login(&body.email, &body.password).await {
        Ok((token, user)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "login successful",
                "token": token,
                "user": user,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Resolve the account behind the presented token.
pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    match services.auth.current_user(auth.user_id()).await {
        Ok(user) => (StatusCode::OK, Json(serde_json::json!({ "user": user }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    match services
        .auth
        .update_profile(auth.user_id(), body.into_update())
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "profile updated", "user": user })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
