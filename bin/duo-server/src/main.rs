//! duo-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or pretty, optional log files).
//! 3. Open the database and run pending migrations.
//! 4. Load the page templates.
//! 5. Start the retention sweep in a background task.
//! 6. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod info;
mod middleware;
mod retention;
mod routes;
mod schemas;
mod state;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use duo_store::AnyStore;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::retention::RetentionPolicy;
use crate::state::AppState;
use crate::views::Views;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "duo-server starting");

    // ── 3. Database ────────────────────────────────────────────────────────────
    let store = Arc::new(AnyStore::connect(&cfg.database_url).await?);
    info!(
        database = info::detect_database_type(Some(cfg.database_url.as_str())),
        "database ready"
    );

    // ── 4. Views ───────────────────────────────────────────────────────────────
    let views = Views::load()?;

    // ── 5. Retention sweep ─────────────────────────────────────────────────────
    let sweeper = match RetentionPolicy::from_config(&cfg)? {
        Some(policy) => {
            info!(
                max_age_hours = cfg.retention_hours,
                interval_secs = policy.interval.as_secs(),
                "retention sweep enabled"
            );
            Some(retention::spawn(Arc::clone(&store), policy))
        }
        None => {
            info!("retention sweep disabled");
            None
        }
    };

    // ── 6. HTTP server with graceful shutdown ──────────────────────────────────
    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        store: Arc::clone(&store),
        views: Arc::new(views),
    });

    let app = routes::build(state);
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    store.close().await;

    info!("duo-server stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `DUO_LOG`; an invalid
/// filter falls back to `info` with a warning on stderr.
fn init_tracing(cfg: &Config) -> Option<WorkerGuard> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: DUO_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let (file_writer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "duo-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    match (file_writer, cfg.log_json) {
        (Some(writer), true) => subscriber.json().with_writer(writer).init(),
        (Some(writer), false) => subscriber.with_ansi(false).with_writer(writer).init(),
        (None, true) => subscriber.json().init(),
        (None, false) => subscriber.init(),
    }

    guard
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
