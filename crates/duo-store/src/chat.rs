//! Time-window queries and the retention sweep over `chat_messages`.
//!
//! The two read bounds differ on purpose: listing is exclusive
//! (`timestamp > since`) while counting is inclusive (`timestamp >= since`).

use crate::{
    AnyStore,
    dao::{ChatMessage, MessageType, NewChatMessage},
    timestamp,
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::str::FromStr;
use tracing::debug;

type MessageRow = (i64, i64, i64, String, String, String);

pub trait ChatStore: Send + Sync + 'static {
    /// Persist a message and return it with its store-assigned id.
    fn save_message(
        &self,
        msg: NewChatMessage,
    ) -> impl Future<Output = Result<ChatMessage, sqlx::Error>> + Send;

    /// All messages with `timestamp > since`, oldest first.
    ///
    /// The result is not bounded; callers on a large store get every row in
    /// the window.
    fn find_messages_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Number of [`MessageType::Chat`] messages with `timestamp >= since`.
    fn count_chat_messages_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Delete every message with `timestamp < before`, whatever its type.
    fn delete_messages_older_than(
        &self,
        before: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Same as [`ChatStore::delete_messages_older_than`], reporting how many
    /// rows were removed.
    fn purge_messages_older_than(
        &self,
        before: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

impl ChatStore for AnyStore {
    async fn save_message(&self, msg: NewChatMessage) -> Result<ChatMessage, sqlx::Error> {
        let (secs, nanos) = timestamp::encode(&msg.timestamp);
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO chat_messages (timestamp_secs, timestamp_nanos, type, sender, content) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
        )
        .bind(secs)
        .bind(nanos)
        .bind(msg.message_type.to_string())
        .bind(&msg.sender)
        .bind(&msg.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(msg.with_id(id))
    }

    async fn find_messages_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let (secs, nanos) = timestamp::encode(&since);
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, timestamp_secs, timestamp_nanos, type, sender, content \
             FROM chat_messages \
             WHERE (timestamp_secs, timestamp_nanos) > (?1, ?2) \
             ORDER BY timestamp_secs ASC, timestamp_nanos ASC, id ASC",
        )
        .bind(secs)
        .bind(nanos)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn count_chat_messages_since(&self, since: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let (secs, nanos) = timestamp::encode(&since);
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chat_messages \
             WHERE (timestamp_secs, timestamp_nanos) >= (?1, ?2) AND type = ?3",
        )
        .bind(secs)
        .bind(nanos)
        .bind(MessageType::Chat.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn delete_messages_older_than(&self, before: DateTime<Utc>) -> Result<(), sqlx::Error> {
        self.purge_messages_older_than(before).await?;
        Ok(())
    }

    async fn purge_messages_older_than(&self, before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let (secs, nanos) = timestamp::encode(&before);
        let result = sqlx::query(
            "DELETE FROM chat_messages WHERE (timestamp_secs, timestamp_nanos) < (?1, ?2)",
        )
        .bind(secs)
        .bind(nanos)
        .execute(&self.pool)
        .await?;
        debug!(
            cutoff = %timestamp::format(&before),
            deleted = result.rows_affected(),
            "purged chat messages"
        );
        Ok(result.rows_affected())
    }
}

fn decode_row(
    (id, secs, nanos, kind, sender, content): MessageRow,
) -> Result<ChatMessage, sqlx::Error> {
    let timestamp = timestamp::decode(secs, nanos).ok_or_else(|| {
        sqlx::Error::Decode(format!("timestamp ({secs}, {nanos}) out of range").into())
    })?;
    let message_type =
        MessageType::from_str(&kind).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(ChatMessage {
        id,
        timestamp,
        message_type,
        sender,
        content,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, TimeZone};

    async fn store() -> AnyStore {
        AnyStore::connect("sqlite::memory:").await.unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn save_assigns_increasing_ids() {
        let store = store().await;
        let a = store.save_message(NewChatMessage::chat("ana", "hi", t0())).await.unwrap();
        let b = store.save_message(NewChatMessage::chat("bo", "hey", t0())).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.sender, "ana");
        assert_eq!(a.timestamp, t0());
    }

    #[tokio::test]
    async fn find_orders_by_timestamp_not_insertion() {
        let store = store().await;
        let late = NewChatMessage::chat("a", "late", t0() + Duration::minutes(2));
        let early = NewChatMessage::chat("a", "early", t0() + Duration::minutes(1));
        store.save_message(late).await.unwrap();
        store.save_message(early).await.unwrap();

        let found = store.find_messages_since(t0()).await.unwrap();
        let bodies: Vec<&str> = found.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(bodies, ["early", "late"]);
    }

    #[tokio::test]
    async fn find_in_the_future_is_empty() {
        let store = store().await;
        store.save_message(NewChatMessage::chat("a", "x", t0())).await.unwrap();
        assert!(store.find_messages_since(t0() + Duration::days(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn boundary_is_exclusive_for_find_and_inclusive_for_count() {
        let store = store().await;
        let at = t0() + Duration::nanoseconds(42);
        store.save_message(NewChatMessage::chat("a", "edge", at)).await.unwrap();

        assert!(store.find_messages_since(at).await.unwrap().is_empty());
        assert_eq!(store.count_chat_messages_since(at).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn purge_reports_deleted_rows() {
        let store = store().await;
        let cutoff = t0() + Duration::minutes(1);
        store.save_message(NewChatMessage::chat("a", "old", t0())).await.unwrap();
        store.save_message(NewChatMessage::system("old notice", t0())).await.unwrap();
        store
            .save_message(NewChatMessage::chat("a", "new", t0() + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.purge_messages_older_than(cutoff).await.unwrap(), 2);
        assert_eq!(store.purge_messages_older_than(cutoff).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn windows_hold_beyond_four_digit_years() {
        let store = store().await;
        let year_10000 = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        store.save_message(NewChatMessage::chat("a", "now", t0())).await.unwrap();

        assert!(store.find_messages_since(year_10000).await.unwrap().is_empty());
        assert!(store.find_messages_since(DateTime::<Utc>::MAX_UTC).await.unwrap().is_empty());
        assert_eq!(store.count_chat_messages_since(year_10000).await.unwrap(), 0);

        let far = store.save_message(NewChatMessage::chat("a", "far", year_10000)).await.unwrap();
        let found = store.find_messages_since(t0()).await.unwrap();
        assert_eq!(found, vec![far]);

        let min = DateTime::<Utc>::MIN_UTC;
        assert_eq!(store.find_messages_since(min).await.unwrap().len(), 2);

        store.delete_messages_older_than(DateTime::<Utc>::MAX_UTC).await.unwrap();
        assert!(store.find_messages_since(min).await.unwrap().is_empty());
    }
}
