//! Periodic retention sweep over the chat message table.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use duo_store::ChatStore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Messages older than `now - max_age` are deleted.
    pub max_age: Duration,
    pub interval: StdDuration,
}

impl RetentionPolicy {
    /// `None` when the sweep is disabled (`retention_hours <= 0`).
    pub fn from_config(cfg: &Config) -> anyhow::Result<Option<Self>> {
        if cfg.retention_hours <= 0 {
            return Ok(None);
        }
        let max_age = Duration::try_hours(cfg.retention_hours).with_context(|| {
            format!("retention age of {} hours is out of range", cfg.retention_hours)
        })?;
        Ok(Some(Self {
            max_age,
            interval: StdDuration::from_secs(cfg.retention_interval_secs.max(1)),
        }))
    }

    /// Saturates at the earliest representable instant, where nothing is
    /// older and the sweep deletes nothing.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.max_age).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Run one sweep at `now`, returning the number of deleted messages.
pub async fn sweep_once<S: ChatStore>(
    store: &S,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let cutoff = policy.cutoff(now);
    let deleted = store.purge_messages_older_than(cutoff).await?;
    if deleted > 0 {
        info!(deleted, cutoff = %cutoff, "retention sweep removed old messages");
    }
    Ok(deleted)
}

/// Spawn the sweep loop. The first sweep runs immediately; failures are
/// logged and retried on the next tick. Abort the handle to stop it.
pub fn spawn<S: ChatStore>(store: Arc<S>, policy: RetentionPolicy) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(policy.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_once(store.as_ref(), &policy, Utc::now()).await {
                warn!(error = %e, "retention sweep failed");
            }
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use duo_store::{AnyStore, NewChatMessage};
    use tracing_test::traced_test;

    fn policy(hours: i64) -> RetentionPolicy {
        RetentionPolicy {
            max_age: Duration::hours(hours),
            interval: StdDuration::from_millis(10),
        }
    }

    #[test]
    fn zero_hours_disables_the_sweep() {
        let cfg = Config { retention_hours: 0, ..Config::default() };
        assert!(RetentionPolicy::from_config(&cfg).unwrap().is_none());

        let cfg = Config { retention_hours: 2, retention_interval_secs: 0, ..Config::default() };
        let policy = RetentionPolicy::from_config(&cfg).unwrap().unwrap();
        assert_eq!(policy.max_age, Duration::hours(2));
        assert_eq!(policy.interval, StdDuration::from_secs(1));
    }

    #[test]
    fn unrepresentable_age_is_an_error() {
        let cfg = Config { retention_hours: i64::MAX, ..Config::default() };
        let err = RetentionPolicy::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn cutoff_saturates_instead_of_overflowing() {
        // Further back than the earliest representable year.
        let huge = RetentionPolicy {
            max_age: Duration::days(365 * 300_000),
            interval: StdDuration::from_secs(1),
        };
        let now = Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap();
        assert_eq!(huge.cutoff(now), DateTime::<Utc>::MIN_UTC);
        assert_eq!(policy(24).cutoff(now), now - Duration::hours(24));
    }

    #[tokio::test]
    #[traced_test]
    async fn sweep_removes_only_expired_messages() {
        let store = AnyStore::connect("sqlite::memory:").await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap();
        for msg in [
            NewChatMessage::chat("a", "stale", now - Duration::hours(30)),
            NewChatMessage::system("stale notice", now - Duration::hours(25)),
            NewChatMessage::chat("a", "fresh", now - Duration::hours(1)),
        ] {
            store.save_message(msg).await.unwrap();
        }

        let deleted = sweep_once(&store, &policy(24), now).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(logs_contain("retention sweep removed old messages"));

        let left = store.find_messages_since(now - Duration::days(30)).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].content, "fresh");
    }

    #[tokio::test]
    async fn spawned_loop_sweeps_and_can_be_aborted() {
        let store = Arc::new(AnyStore::connect("sqlite::memory:").await.unwrap());
        store
            .save_message(NewChatMessage::chat("a", "ancient", Utc::now() - Duration::days(10)))
            .await
            .unwrap();

        let handle = spawn(Arc::clone(&store), policy(24));
        tokio::time::sleep(StdDuration::from_millis(100)).await;
        handle.abort();

        let left = store.find_messages_since(Utc::now() - Duration::days(365)).await.unwrap();
        assert!(left.is_empty());
    }
}
