use crate::config::Config;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

pub fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new().allow_headers(Any).allow_methods(Any);

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .map(|list| list.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    // Wildcard when unset or unparsable; set DUO_CORS_ORIGINS in production.
    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(origins)
    }
}
