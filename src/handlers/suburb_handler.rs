use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde_json::json;

use crate::state::AppState;
use crate::utils::handler::HandlerResult;
use crate::utils::response::ApiResponse;

pub async fn index(Extension(state): Extension<AppState>) -> HandlerResult {
    let suburbs = state.suburbs.list_all().await?;

    let response = ApiResponse::success_with_data("List of suburbs", json!(suburbs));
    Ok((StatusCode::OK, Json(response)))
}

/// Name matches first, then postcode matches. A suburb matching both
/// appears twice.
pub async fn search(
    Extension(state): Extension<AppState>,
    Path(keyword): Path<String>,
) -> HandlerResult {
    let mut suburbs = state.suburbs.search_by_name(&keyword).await?;
    if let Ok(postcode) = keyword.parse::<i32>() {
        suburbs.extend(state.suburbs.find_by_postcode(postcode).await?);
    }

    let response = ApiResponse::success_with_data("Suburbs found", json!(suburbs));
    Ok((StatusCode::OK, Json(response)))
}
