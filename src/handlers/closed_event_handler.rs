use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::instructor::Instructor;
use crate::schemas::closed_event_schema::ClosedEventSchema;
use crate::state::AppState;
use crate::utils::handler::HandlerResult;
use crate::utils::jwt::Claims;
use crate::utils::response::ApiResponse;
use crate::utils::validation::validate_payload;

async fn current_instructor(state: &AppState, claims: &Claims) -> Result<Instructor, AppError> {
    state
        .instructors
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("No instructor found with this id".into()))
}

pub async fn store(
    Extension(state): Extension<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ClosedEventSchema>,
) -> HandlerResult {
    validate_payload(&payload)?;
    let event = payload.into_event()?;

    let instructor = state
        .instructors
        .push_closed_event(claims.sub, &event)
        .await?
        .ok_or_else(|| AppError::NotFound("No instructor found with this id".into()))?;

    let response = ApiResponse::success_with_data(
        "Closed event added",
        json!({ "event": event, "closedEvents": instructor.closed_events }),
    );
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn index(
    Extension(state): Extension<AppState>,
    Extension(claims): Extension<Claims>,
) -> HandlerResult {
    let instructor = current_instructor(&state, &claims).await?;

    let response = ApiResponse::success_with_data(
        "List of closed events",
        json!({ "closedEvents": instructor.closed_events }),
    );
    Ok((StatusCode::OK, Json(response)))
}

pub async fn destroy(
    Extension(state): Extension<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<Uuid>,
) -> HandlerResult {
    let instructor = state
        .instructors
        .remove_closed_event(claims.sub, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No closed event found with this id".into()))?;

    tracing::debug!(instructor_id = claims.sub, %event_id, "closed event removed");
    let response = ApiResponse::success_with_data(
        "Closed event deleted",
        json!({ "closedEvents": instructor.closed_events }),
    );
    Ok((StatusCode::OK, Json(response)))
}
