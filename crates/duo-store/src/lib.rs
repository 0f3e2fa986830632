//! Persistence layer for duo-server.
//!
//! [`ChatStore`] and [`PetStore`] define the queries the server needs. Both
//! are implemented for [`AnyStore`], which wraps a sqlx `Any` pool so the
//! backing database is picked by the URL scheme at runtime. The embedded
//! migrations are written for SQLite.
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod chat;
pub mod dao;
pub mod pet;
pub mod timestamp;

pub use dao::{ChatMessage, MessageType, NewChatMessage, Pet};

pub use chat::ChatStore;
pub use pet::PetStore;

use std::str::FromStr;

use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use tracing::debug;

/// Handle to the durable record store.
#[derive(Clone, Debug)]
pub struct AnyStore {
    pool: sqlx::AnyPool,
}

impl AnyStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible URL, e.g. `"sqlite://duo.db?mode=rwc"`
    /// or `"sqlite::memory:"` for tests. In-memory databases live only as long
    /// as their connection, so they get a pool of exactly one connection that
    /// is never recycled.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let options = AnyConnectOptions::from_str(url)?;

        let pool = if is_in_memory(url) {
            AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            AnyPoolOptions::new().connect_with(options).await?
        };

        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("migrations applied");
        Ok(Self { pool })
    }

    /// Cheap round-trip used by the health endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
