use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{post, put},
    Router,
};

use crate::handlers::login_handler::login_handler;
use crate::handlers::password_handler::{forgot_password, reset_password};
use crate::handlers::register_handler::register_handler;
use crate::middlewares::rate_limiter::rate_limiter;

/// Largest accepted multipart body (avatar uploads).
pub const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

// Function to create auth routes
pub fn auth_routes() -> Router {
    // Credential endpoints are rate limited per client
    let limited = Router::new()
        .route("/instructor-login", post(login_handler))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", put(reset_password))
        .route_layer(middleware::from_fn(rate_limiter));

    Router::new()
        .route(
            "/instructor-register",
            post(register_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .merge(limited)
}
