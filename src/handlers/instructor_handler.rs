use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::models::instructor::{public_view, ProfileUpdate, PublicInstructor};
use crate::schemas::instructor_schema::{
    AvailabilitySchema, EditProfileSchema, SearchQuery, AVATAR_FORM,
};
use crate::services::images::ImageUpload;
use crate::services::ratings::{filter_by_language, sort_by_average_rating};
use crate::state::AppState;
use crate::utils::handler::HandlerResult;
use crate::utils::jwt::Claims;
use crate::utils::multipart::read_form;
use crate::utils::response::ApiResponse;
use crate::utils::validation::validate_payload;

fn instructor_not_found() -> AppError {
    AppError::NotFound("No instructor found with this id".into())
}

pub async fn show(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult {
    let instructor = state
        .instructors
        .find_by_id(id)
        .await?
        .ok_or_else(instructor_not_found)?;

    let response =
        ApiResponse::success_with_data("Instructor found", json!(PublicInstructor::from(instructor)));
    Ok((StatusCode::OK, Json(response)))
}

/// Instructors serving a postcode, optionally narrowed to one language.
/// Without a language filter the best rated come first.
pub async fn search(
    Extension(state): Extension<AppState>,
    Path((post_code, transmission)): Path<(String, String)>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult {
    let mut instructors = state
        .instructors
        .search(post_code.trim(), transmission.trim())
        .await?;

    match query.language_filter() {
        Some(language) => instructors = filter_by_language(instructors, language),
        None => sort_by_average_rating(&mut instructors),
    }

    let instructors = public_view(instructors);
    let response = ApiResponse::success_with_data(
        "Instructors found",
        json!({ "count": instructors.len(), "instructors": instructors }),
    );
    Ok((StatusCode::OK, Json(response)))
}

pub async fn edit_profile(
    Extension(state): Extension<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EditProfileSchema>,
) -> HandlerResult {
    validate_payload(&payload)?;

    let update = ProfileUpdate::from(payload);
    let instructor = state
        .instructors
        .update_profile(claims.sub, &update)
        .await?
        .ok_or_else(instructor_not_found)?;

    let response = ApiResponse::success_with_data("Profile updated", json!(instructor));
    Ok((StatusCode::OK, Json(response)))
}

pub async fn update_avatar(
    Extension(state): Extension<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> HandlerResult {
    let form = read_form(multipart, &AVATAR_FORM).await?;
    let image = form
        .file
        .ok_or_else(|| AppError::invalid_field("image", "Avatar image is required"))?;
    if !image.is_image() {
        return Err(AppError::invalid_field("image", "Uploaded file must be an image"));
    }

    // Make sure the account still exists before paying for an upload
    if state.instructors.find_by_id(claims.sub).await?.is_none() {
        return Err(instructor_not_found());
    }

    let url = state
        .images
        .upload(ImageUpload {
            file_name: image.file_name,
            content_type: image.content_type,
            bytes: image.bytes,
        })
        .await?;

    let instructor = state
        .instructors
        .set_avatar(claims.sub, &url)
        .await?
        .ok_or_else(instructor_not_found)?;

    let response = ApiResponse::success_with_data("Avatar updated", json!(instructor));
    Ok((StatusCode::OK, Json(response)))
}

pub async fn change_availability(
    Extension(state): Extension<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilitySchema>,
) -> HandlerResult {
    if claims.sub != id {
        return Err(AppError::Forbidden(
            "You can only change your own availability".into(),
        ));
    }

    let instructor = state
        .instructors
        .set_available(id, payload.available)
        .await?
        .ok_or_else(instructor_not_found)?;

    let response = ApiResponse::success_with_data("Availability updated", json!(instructor));
    Ok((StatusCode::OK, Json(response)))
}

pub async fn expired_licenses(Extension(state): Extension<AppState>) -> HandlerResult {
    let now = Utc::now();
    let instructors = state.instructors.find_with_expired_licenses(now).await?;

    let response = ApiResponse::success_with_data(
        "Instructors with expired licenses",
        json!({ "instructors": public_view(instructors), "date": now }),
    );
    Ok((StatusCode::OK, Json(response)))
}
