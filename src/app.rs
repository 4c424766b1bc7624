use axum::{
    http::{header::HeaderValue, Method},
    Extension, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, CorsConfig, ImageStoreConfig};
use crate::state::AppState;

fn cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    let origins = cors.allowed_origins.as_ref()?;
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

    let layer = if cors.allows_any() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect::<Vec<HeaderValue>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };
    Some(layer.allow_methods(methods).allow_headers(Any))
}

pub fn build_router(config: &AppConfig) -> Router {
    let mut app = Router::new()
        .merge(crate::routes::auth_routes::auth_routes())
        .merge(crate::routes::instructor_routes::instructor_routes())
        .merge(crate::routes::suburb_routes::suburb_routes());

    // Locally stored avatars are served by the API itself
    if let ImageStoreConfig::Local { upload_dir, .. } = &config.images {
        app = app.nest_service("/uploads", ServeDir::new(upload_dir));
    }

    if let Some(cors) = cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    // Proxy header middleware (resolve client IP behind proxies such as Cloudflare).
    // Added after the routes so it runs before the per-route rate limiter.
    app.layer(axum::middleware::from_fn(crate::middlewares::proxy::proxy_middleware))
        .layer(TraceLayer::new_for_http())
}

pub fn create_app(state: AppState) -> Router {
    build_router(&state.config).layer(Extension(state))
}
