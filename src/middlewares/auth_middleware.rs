use axum::{extract::Request, http::header, middleware::Next, response::Response};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt::decode_jwt;

// Authentication middleware to protect routes. On success the decoded
// `Claims` are available to handlers as an extension.
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, AppError> {
    let state = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state missing".into()))?;

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .unwrap_or("");

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header format".into()))?;

    let claims = decode_jwt(token, &state.config.auth.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
