//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use duo_store::AnyStore;

use crate::config::Config;
use crate::views::Views;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Chat message and pet store.
    pub store: Arc<AnyStore>,
    /// Compiled page templates.
    pub views: Arc<Views>,
}
