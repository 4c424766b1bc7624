pub mod closed_event_handler;
pub mod health_handler;
pub mod instructor_handler;
pub mod login_handler;
pub mod password_handler;
pub mod rating_handler;
pub mod register_handler;
pub mod suburb_handler;
