use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};

use skillbridge_core::EventId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<dto::CreateEventRequest>,
) -> axum::response::Response {
    let input = match body.into_new_event() {
        Ok(input) => input,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.events.create_event(auth.user_id(), input).await {
        Ok(view) => {
            services.publish("event.created", serde_json::json!({ "event_id": view.id }));
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "message": "event created", "event": view })),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListEventsParams>,
) -> axum::response::Response {
    let query = match params.into_query() {
        Ok(query) => query,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.events.list_events(&query).await {
        Ok((views, page)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "events": views, "pagination": page })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EventId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.events.get_event(id).await {
        Ok(view) => (StatusCode::OK, Json(serde_json::json!({ "event": view }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateEventRequest>,
) -> axum::response::Response {
    let id: EventId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let patch = match body.into_patch() {
        Ok(patch) => patch,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.events.update_event(auth.user_id(), id, patch).await {
        Ok(view) => {
            services.publish("event.updated", serde_json::json!({ "event_id": view.id }));
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "event updated", "event": view })),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EventId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.events.delete_event(auth.user_id(), id).await {
        Ok(()) => {
            services.publish("event.deleted", serde_json::json!({ "event_id": id }));
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "event deleted" })),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EventId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.events.register(auth.user_id(), id).await {
        Ok(view) => {
            services.publish(
                "event.registration",
                serde_json::json!({
                    "event_id": view.id,
                    "attendee_count": view.attendee_count,
                }),
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "registration confirmed", "event": view })),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn cancel_registration(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EventId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.events.cancel_registration(auth.user_id(), id).await {
        Ok(view) => {
            services.publish(
                "event.cancellation",
                serde_json::json!({
                    "event_id": view.id,
                    "attendee_count": view.attendee_count,
                }),
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "registration cancelled", "event": view })),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn user_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    let dashboard = services.events.user_events(auth.user_id()).await;
    (StatusCode::OK, Json(dashboard)).into_response()
}
