use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::instructor::ClosedEvent;
use crate::utils::dates::deserialize_optional_timestamp;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClosedEventSchema {
    #[serde(default)]
    #[validate(length(min = 1, message = "Event name cannot be empty"))]
    pub event_name: String,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[validate(required(message = "Start time is required"))]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[validate(required(message = "End time is required"))]
    pub end_time: Option<DateTime<Utc>>,
}

impl ClosedEventSchema {
    /// Checks the window and assigns a fresh id. Call after `validate`.
    pub fn into_event(self) -> Result<ClosedEvent, AppError> {
        let (start_time, end_time) = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (start, end),
            (None, _) => return Err(AppError::invalid_field("start_time", "Start time is required")),
            (_, None) => return Err(AppError::invalid_field("end_time", "End time is required")),
        };
        if end_time <= start_time {
            return Err(AppError::invalid_field("end_time", "End time must be after start time"));
        }
        Ok(ClosedEvent {
            id: Uuid::new_v4(),
            event_name: self.event_name.trim().to_string(),
            start_time,
            end_time,
        })
    }
}
