use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::closed_event_handler;
use crate::handlers::health_handler::health;
use crate::handlers::instructor_handler::{
    change_availability, edit_profile, expired_licenses, search, show, update_avatar,
};
use crate::handlers::rating_handler::post_rating;
use crate::middlewares::auth_middleware::auth_middleware;
use crate::routes::auth_routes::UPLOAD_BODY_LIMIT;

pub fn instructor_routes() -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/instructor/{id}", get(show))
        .route("/instructors/search/{postCode}/{transmission}", get(search))
        .route("/rating", post(post_rating));

    let protected = Router::new()
        .route("/edit-profile", put(edit_profile))
        .route(
            "/avatar",
            put(update_avatar).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/availability/{id}", put(change_availability))
        .route("/expired-licenses", get(expired_licenses))
        .route(
            "/closed-events",
            post(closed_event_handler::store).get(closed_event_handler::index),
        )
        .route("/closed-events/{eventId}", delete(closed_event_handler::destroy))
        // Apply authentication middleware to instructor-owned routes
        .route_layer(middleware::from_fn(auth_middleware));

    public.merge(protected)
}
