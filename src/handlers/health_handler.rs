use crate::state::AppState;
use crate::utils::handler::HandlerResult;
use crate::utils::response::ApiResponse;
use axum::{Extension, Json, http::StatusCode};
use serde_json::json;

pub async fn health(Extension(state): Extension<AppState>) -> HandlerResult {
    // Try a simple DB ping/query
    state.instructors.ping().await?;

    let response = ApiResponse::success_with_data("OK", json!({ "db": "ok" }));
    Ok((StatusCode::OK, Json(response)))
}
