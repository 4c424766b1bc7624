pub mod closed_event_schema;
pub mod instructor_schema;
pub mod login_schema;
pub mod password_schema;
pub mod rating_schema;
pub mod register_schema;
