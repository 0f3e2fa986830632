use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::error::ServerError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies larger than this are summarised instead of logged.
const MAX_LOGGED_BODY: usize = 1024;

/// Requests with a larger body are rejected with 413 before reaching a handler.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Tags every request with a trace id (taken from `x-trace-id` when it is a
/// valid UUID) and logs method, path, status and latency inside one span.
pub async fn trace_middleware(req: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");

        let (parts, body) = req.into_parts();
        let body = match buffer_and_log("request", &parts.headers, body).await {
            Ok(body) => body,
            Err(err) => {
                let mut response = err.into_response();
                if let Some(value) = trace_header {
                    response.headers_mut().insert(X_TRACE_ID, value);
                }
                info!(
                    status = response.status().as_u16(),
                    latency_ms = start_time.elapsed().as_millis(),
                    "← request body rejected"
                );
                return response;
            }
        };
        let mut req = Request::from_parts(parts, Body::from(body));
        if let Some(value) = &trace_header {
            req.headers_mut().insert(X_TRACE_ID, value.clone());
        }

        let mut response = next.run(req).await;
        if let Some(value) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Collects the request body, at most [`MAX_BODY_BYTES`], so small JSON
/// payloads can be logged at debug level, then hands the bytes back for the
/// inner service.
async fn buffer_and_log(
    direction: &str,
    headers: &HeaderMap,
    body: Body,
) -> Result<Bytes, ServerError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let bytes = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(ServerError::PayloadTooLarge(format!(
                "{direction} body exceeds {MAX_BODY_BYTES} bytes"
            )));
        }
        Err(e) => {
            return Err(ServerError::BadRequest(format!("failed to read {direction} body: {e}")));
        }
    };

    if content_type.contains("application/json") && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            debug!("{direction} body: {text}");
        }
    } else if !bytes.is_empty() {
        debug!("{direction} body: [skipped: type={content_type}, size={}]", bytes.len());
    }

    Ok(bytes)
}
