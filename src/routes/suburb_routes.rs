use axum::{routing::get, Router};

use crate::handlers::suburb_handler::{index, search};

pub fn suburb_routes() -> Router {
    Router::new()
        .route("/suburbs", get(index))
        .route("/suburbs/search/{keyword}", get(search))
}
