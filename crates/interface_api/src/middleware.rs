//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{has_role, permissions, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token, checks the read or write permission for the
/// request method and stores both the claims and the owner id in the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| {
            warn!("Missing or invalid Authorization header");
            ApiError::Unauthorized
        })?;

    let claims = crate::auth::validate_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!("Token validation failed: {:?}", e);
        ApiError::Unauthorized
    })?;

    let owner = claims.owner_id().map_err(|e| {
        warn!("Token subject rejected: {}", e);
        ApiError::Unauthorized
    })?;

    let required = required_permission(request.method());
    if !has_role(&claims, required) {
        return Err(ApiError::Forbidden(format!("missing permission {}", required)));
    }

    request.extensions_mut().insert(owner);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn required_permission(method: &Method) -> &'static str {
    if method == Method::GET || method == Method::HEAD {
        permissions::LEDGER_READ
    } else {
        permissions::LEDGER_WRITE
    }
}

/// Audit logging middleware
///
/// Logs every API request with the calling owner, status and duration
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let owner = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        owner = %owner,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
