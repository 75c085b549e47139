//! Cross-origin policy
//!
//! Browsers get the usual CORS headers from [`cors_layer`]. On top of that,
//! [`enforce_allowed_origin`] refuses any request that carries an `Origin`
//! outside the allow-list, so disallowed sites cannot reach handlers even with
//! simple requests. Requests without an `Origin` header (tools, other servers)
//! pass through.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{config::CorsConfig, error::AppError, AppState};

const WILDCARD: &str = "*";

fn allows_any(config: &CorsConfig) -> bool {
    config.allowed_origins.iter().any(|o| o == WILDCARD)
}

/// Whether a request from `origin` may proceed
pub fn is_allowed(config: &CorsConfig, origin: &str) -> bool {
    allows_any(config) || config.allowed_origins.iter().any(|o| o == origin)
}

/// CORS response headers for the configured origins
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if allows_any(config) {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Reject requests from origins outside the allow-list
pub async fn enforce_allowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !is_allowed(&state.config.cors, origin) {
            tracing::warn!("Rejected request from origin {:?}", origin);
            return Err(AppError::OriginNotAllowed(origin.to_string()));
        }
    }

    Ok(next.run(request).await)
}
