use axum::{extract::Multipart, http::StatusCode, Extension, Json};
use serde_json::json;

use crate::error::AppError;
use crate::schemas::register_schema::{RegisterSchema, REGISTER_FORM};
use crate::services::images::ImageUpload;
use crate::services::mail::{send_in_background, welcome_email};
use crate::state::AppState;
use crate::utils::auth::hash_password_blocking;
use crate::utils::handler::HandlerResult;
use crate::utils::multipart::read_form;
use crate::utils::response::ApiResponse;
use crate::utils::validation::validate_payload;

// Handler for instructor registration (multipart form with avatar image)
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    multipart: Multipart,
) -> HandlerResult {
    let form = read_form(multipart, &REGISTER_FORM).await?;
    let (mut payload, image): (RegisterSchema, _) = form.into_payload()?;

    // Normalize email for consistent duplicate checks and storage
    payload.email = payload.normalized_email();
    validate_payload(&payload)?;

    let image = image.ok_or_else(|| AppError::invalid_field("image", "Avatar image is required"))?;
    if !image.is_image() {
        return Err(AppError::invalid_field("image", "Uploaded file must be an image"));
    }

    // Reject duplicates before anything is uploaded
    if state.instructors.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let avatar = state
        .images
        .upload(ImageUpload {
            file_name: image.file_name,
            content_type: image.content_type,
            bytes: image.bytes,
        })
        .await?;

    let password_hash =
        hash_password_blocking(payload.password.clone(), state.config.auth.bcrypt_cost, None).await?;
    let instructor = state
        .instructors
        .create(payload.into_new_instructor(password_hash, avatar)?)
        .await?;

    tracing::info!(instructor_id = instructor.id, "instructor registered");
    send_in_background(
        state.mailer.clone(),
        welcome_email(&instructor.email, &instructor.first_name),
    );

    let response = ApiResponse::success_with_data("Instructor registered", json!(instructor));
    Ok((StatusCode::CREATED, Json(response)))
}
