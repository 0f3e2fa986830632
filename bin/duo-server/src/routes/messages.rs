//! Chat message API.
//!
//! Thin HTTP layer over [`ChatStore`]: the list / count windows and the
//! retention delete keep the store's exact bound semantics.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use duo_store::{ChatStore, MessageType, NewChatMessage};
use tracing::{debug, info};
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ServerError;
use crate::schemas::messages::{
    BeforeQuery, CountResponse, CreateMessageRequest, DeleteResponse, MessageResponse, SinceQuery,
};
use crate::state::AppState;

/// Window used by the count endpoint when no `since` is given.
const DEFAULT_COUNT_HOURS: i64 = 24;

#[derive(OpenApi)]
#[openapi(
    paths(create_message, list_messages, count_chat_messages, delete_old_messages),
    components(schemas(CreateMessageRequest, MessageResponse, CountResponse, DeleteResponse))
)]
pub struct MessagesApi;

/// Register message routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/messages",
            post(create_message).get(list_messages).delete(delete_old_messages),
        )
        .route("/messages/count", get(count_chat_messages))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = CreateMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Invalid body"),
        (status = 500, description = "Store error"),
    )
)]
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    req.validate()?;

    let message_type = match req.message_type.as_deref() {
        None => MessageType::Chat,
        Some(raw) => MessageType::from_str(raw)
            .map_err(|_| ServerError::BadRequest(format!("unknown message type '{raw}'")))?,
    };
    let timestamp = match req.timestamp.as_deref() {
        None => Utc::now(),
        Some(raw) => parse_timestamp("timestamp", raw)?,
    };

    let saved = state
        .store
        .save_message(NewChatMessage {
            timestamp,
            message_type,
            sender: req.sender,
            content: req.content,
        })
        .await?;
    debug!(id = saved.id, kind = %saved.message_type, "message stored");
    Ok(Json(saved.into()))
}

#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "messages",
    params(SinceQuery),
    responses(
        (
            status = 200,
            description = "Messages strictly after `since`, oldest first",
            body = Vec<MessageResponse>
        ),
        (status = 400, description = "Malformed `since` or window out of range"),
        (status = 500, description = "Store error"),
    )
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SinceQuery>,
) -> Result<Json<Vec<MessageResponse>>, ServerError> {
    let since = since_or_window(query.since.as_deref(), state.config.history_hours)?;
    let messages = state.store.find_messages_since(since).await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/messages/count",
    tag = "messages",
    params(SinceQuery),
    responses(
        (status = 200, description = "CHAT messages at or after `since`", body = CountResponse),
        (status = 400, description = "Malformed `since`"),
        (status = 500, description = "Store error"),
    )
)]
pub async fn count_chat_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SinceQuery>,
) -> Result<Json<CountResponse>, ServerError> {
    let since = since_or_window(query.since.as_deref(), DEFAULT_COUNT_HOURS)?;
    let count = state.store.count_chat_messages_since(since).await?;
    Ok(Json(CountResponse {
        since: duo_store::timestamp::format(&since),
        count,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/messages",
    tag = "messages",
    params(BeforeQuery),
    responses(
        (status = 200, description = "Messages older than `before` deleted", body = DeleteResponse),
        (status = 400, description = "Missing or malformed `before`"),
        (status = 500, description = "Store error"),
    )
)]
pub async fn delete_old_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BeforeQuery>,
) -> Result<Json<DeleteResponse>, ServerError> {
    let raw = query
        .before
        .as_deref()
        .ok_or_else(|| ServerError::BadRequest("query parameter 'before' is required".into()))?;
    let before = parse_timestamp("before", raw)?;
    state.store.delete_messages_older_than(before).await?;
    info!(before = %raw, "deleted messages older than cutoff");
    Ok(Json(DeleteResponse {
        deleted: true,
        before: duo_store::timestamp::format(&before),
    }))
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ServerError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ServerError::BadRequest(format!("invalid '{field}' ({e}): expected RFC 3339")))
}

fn since_or_window(raw: Option<&str>, hours: i64) -> Result<DateTime<Utc>, ServerError> {
    match raw {
        Some(raw) => parse_timestamp("since", raw),
        None => Duration::try_hours(hours)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                ServerError::BadRequest(format!("window of {hours} hours is out of range"))
            }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_accepts_offsets() {
        let ts = parse_timestamp("since", "2024-01-01T10:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_timestamp("since", "yesterday").unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(m) if m.contains("since")));
    }

    #[test]
    fn missing_since_uses_window() {
        let before = Utc::now() - Duration::hours(3);
        let since = since_or_window(None, 3).unwrap();
        assert!(since >= before);
        assert!(since <= Utc::now());
    }

    #[test]
    fn oversized_window_is_rejected_not_panicking() {
        let err = since_or_window(None, 10_000_000_000).unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(m) if m.contains("out of range")));
        assert!(since_or_window(None, i64::MAX).is_err());
    }
}
