use axum::{http::StatusCode, Extension, Json};
use serde_json::json;

use crate::error::AppError;
use crate::models::booking::Booking;
use crate::models::instructor::{PublicInstructor, Review};
use crate::schemas::rating_schema::RatingSchema;
use crate::state::AppState;
use crate::utils::handler::HandlerResult;
use crate::utils::response::ApiResponse;
use crate::utils::validation::validate_payload;

// The booking is claimed before the review is appended, so a booking yields
// at most one review. The two writes are not in one transaction.
pub async fn post_rating(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RatingSchema>,
) -> HandlerResult {
    validate_payload(&payload)?;

    let booking = state
        .bookings
        .find_by_id(payload.booking)
        .await?
        .ok_or_else(|| AppError::NotFound("No booking found with this id".into()))?;

    if booking.instructor_id != payload.instructor {
        return Err(AppError::BadRequest(
            "Booking does not belong to this instructor".into(),
        ));
    }
    if state.instructors.find_by_id(payload.instructor).await?.is_none() {
        return Err(AppError::NotFound("No instructor found with this id".into()));
    }

    if !state.bookings.mark_reviewed(booking.id).await? {
        return Err(AppError::Conflict("Booking has already been reviewed".into()));
    }

    let review = Review {
        user: booking.learner_name.clone(),
        rating: payload.rating,
        message: payload.review.trim().to_string(),
    };
    let instructor = state
        .instructors
        .push_review(payload.instructor, &review)
        .await?
        .ok_or_else(|| AppError::NotFound("No instructor found with this id".into()))?;

    let booking = Booking { reviewed: true, ..booking };
    let response = ApiResponse::success_with_data(
        "Review added",
        json!({ "instructor": PublicInstructor::from(instructor), "booking": booking }),
    );
    Ok((StatusCode::OK, Json(response)))
}
