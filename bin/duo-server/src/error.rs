//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! Internal errors (database, template rendering) are logged with full detail
//! but only a generic message is returned to the caller, so SQL and template
//! internals never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the duo-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated unchanged from the record store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The info page template failed to render.
    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the server's size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Database(_) | ServerError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let client_message = match &self {
            ServerError::NotFound(m)
            | ServerError::BadRequest(m)
            | ServerError::PayloadTooLarge(m) => m.clone(),
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                "internal server error".to_owned()
            }
            ServerError::Render(e) => {
                error!(error = %e, "template render error");
                "internal server error".to_owned()
            }
        };
        (self.status(), Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<validator::ValidationErrors> for ServerError {
    fn from(e: validator::ValidationErrors) -> Self {
        ServerError::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let (status, body) = body_json(ServerError::BadRequest("bad since".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad since");
    }

    #[tokio::test]
    async fn database_errors_are_masked() {
        let (status, body) = body_json(ServerError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }
}
