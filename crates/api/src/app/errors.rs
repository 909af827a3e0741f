use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use skillbridge_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::DuplicateEmail => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate_email",
            "user already exists with this email",
        ),
        DomainError::AlreadyRegistered => json_error(
            StatusCode::BAD_REQUEST,
            "already_registered",
            "already registered for this event",
        ),
        DomainError::EventFull => json_error(StatusCode::BAD_REQUEST, "event_full", "event is full"),
        DomainError::NotRegistered => json_error(
            StatusCode::BAD_REQUEST,
            "not_registered",
            "not registered for this event",
        ),
        DomainError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid email or password",
        ),
        DomainError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        DomainError::Forbidden => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "not authorized to perform this action",
        ),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Store(msg) => {
            // Internals never leak to clients.
            tracing::error!(error = %msg, "store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
