use serde::Deserialize;
use validator::Validate;

/// A learner's rating for a finished booking.
#[derive(Debug, Deserialize, Validate)]
pub struct RatingSchema {
    /// Instructor id.
    pub instructor: i64,
    /// Booking id.
    pub booking: i64,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: f64,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Review is too long"))]
    pub review: String,
}
