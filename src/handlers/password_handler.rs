use axum::{http::StatusCode, Extension, Json};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::models::instructor::default_week;
use crate::schemas::password_schema::{ForgotPasswordSchema, ResetPasswordSchema};
use crate::services::mail::{password_reset_email, send_in_background};
use crate::services::reset_token::{is_reset_token_live, issue_reset_token};
use crate::state::AppState;
use crate::utils::auth::hash_password_blocking;
use crate::utils::handler::HandlerResult;
use crate::utils::response::ApiResponse;
use crate::utils::validation::validate_payload;

pub async fn forgot_password(
    Extension(state): Extension<AppState>,
    Json(mut payload): Json<ForgotPasswordSchema>,
) -> HandlerResult {
    payload.email = payload.email.trim().to_lowercase();
    validate_payload(&payload)?;

    let instructor = state
        .instructors
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::NotFound("No instructor found with this email".into()))?;

    let ttl = state.config.auth.reset_token_ttl_secs;
    let issued = issue_reset_token(Utc::now(), ttl);
    state
        .instructors
        .store_reset_token(instructor.id, &issued.token, issued.expires_at)
        .await?;

    send_in_background(
        state.mailer.clone(),
        password_reset_email(&instructor.email, &instructor.first_name, &issued.token, ttl),
    );

    let response = ApiResponse::success_with_data(
        "Please check your email, password reset code sent",
        json!({ "expiresAt": issued.expires_at }),
    );
    Ok((StatusCode::OK, Json(response)))
}

pub async fn reset_password(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ResetPasswordSchema>,
) -> HandlerResult {
    validate_payload(&payload)?;

    let ticket = state
        .instructors
        .find_reset_ticket(payload.token.trim())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid reset token".into()))?;

    if !is_reset_token_live(ticket.expires_at, Utc::now()) {
        return Err(AppError::BadRequest(
            "Reset token has expired, please request a new one".into(),
        ));
    }

    let password_hash =
        hash_password_blocking(payload.new_password, state.config.auth.bcrypt_cost, None).await?;
    let completed = state
        .instructors
        .complete_password_reset(ticket.instructor_id, &ticket.token, &password_hash, &default_week())
        .await?;
    if !completed {
        // consumed by a concurrent reset
        return Err(AppError::BadRequest("Invalid reset token".into()));
    }

    tracing::info!(instructor_id = ticket.instructor_id, "password reset completed");
    let response = ApiResponse::success_with_data(
        "Password updated",
        json!({ "instructorId": ticket.instructor_id }),
    );
    Ok((StatusCode::OK, Json(response)))
}
