use axum::{http::StatusCode, Extension, Json};
use serde_json::json;

use crate::error::AppError;
use crate::schemas::login_schema::{LoginResponseSchema, LoginSchema};
use crate::state::AppState;
use crate::utils::auth::verify_password_blocking;
use crate::utils::handler::HandlerResult;
use crate::utils::jwt::create_jwt;
use crate::utils::response::ApiResponse;
use crate::utils::validation::validate_payload;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// Handler for instructor login
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(mut payload): Json<LoginSchema>,
) -> HandlerResult {
    payload.email = payload.email.trim().to_lowercase();
    validate_payload(&payload)?;

    let credentials = state
        .instructors
        .find_credentials(&payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let matches = verify_password_blocking(payload.password, credentials.password_hash, None).await?;
    if !matches {
        tracing::info!(instructor_id = credentials.id, "login rejected: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let instructor = state
        .instructors
        .find_by_id(credentials.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let auth = &state.config.auth;
    let token = create_jwt(instructor.id, &auth.jwt_secret, auth.jwt_expire_days)
        .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))?;

    // Build response schema
    let login_response = LoginResponseSchema { instructor, token };
    let response = ApiResponse::success_with_data("Login successful", json!(login_response));
    Ok((StatusCode::OK, Json(response)))
}
