use serde::{Deserialize, Serialize};

/// Lesson booking owned by the booking service. This crate only reads it
/// and flips `reviewed` once a rating has been posted.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub instructor_id: i64,
    pub learner_name: String,
    pub reviewed: bool,
}
