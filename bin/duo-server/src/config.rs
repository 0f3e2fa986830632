//! Server configuration, loaded from environment variables at startup.

use uuid::Uuid;

/// Upper bound for hour-valued settings (100 years).
pub const MAX_WINDOW_HOURS: i64 = 24 * 365 * 100;

/// Runtime configuration for duo-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// sqlx database URL (default: `"sqlite://duo.db?mode=rwc"`).
    /// Also the input of the vendor label on the info page.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for daily-rotated log files; stdout only when unset.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins; wildcard when unset.
    pub cors_allowed_origins: Option<String>,

    /// Instance identifier shown on the info page.
    pub app_uuid: String,

    /// Application version shown on the info page.
    pub app_version: String,

    /// Deployment colour label (blue/green rollouts).
    pub deployment_color: String,

    /// Window used by `GET /api/messages` when no `since` is given.
    /// Always within `0..=MAX_WINDOW_HOURS`.
    pub history_hours: i64,

    /// Messages older than this are removed by the retention sweep.
    /// `0` disables the sweep.
    pub retention_hours: i64,

    /// Seconds between two retention sweeps.
    pub retention_interval_secs: u64,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("DUO_BIND", "0.0.0.0:3000"),
            database_url: env_or("DUO_DATABASE_URL", "sqlite://duo.db?mode=rwc"),
            log_level: env_or("DUO_LOG", "info"),
            log_json: std::env::var("DUO_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            log_dir: non_empty_env("DUO_LOG_DIR"),
            cors_allowed_origins: non_empty_env("DUO_CORS_ORIGINS"),
            app_uuid: non_empty_env("DUO_APP_UUID").unwrap_or_else(|| Uuid::new_v4().to_string()),
            app_version: env_or("DUO_APP_VERSION", env!("CARGO_PKG_VERSION")),
            deployment_color: env_or("DUO_DEPLOYMENT_COLOR", "blue"),
            history_hours: parse_hours("DUO_HISTORY_HOURS", 24),
            retention_hours: parse_hours("DUO_RETENTION_HOURS", 168),
            retention_interval_secs: parse_env("DUO_RETENTION_INTERVAL_SECS", 3600),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_owned(),
            database_url: "sqlite://duo.db?mode=rwc".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            log_dir: None,
            cors_allowed_origins: None,
            app_uuid: Uuid::new_v4().to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_owned(),
            deployment_color: "blue".to_owned(),
            history_hours: 24,
            retention_hours: 168,
            retention_interval_secs: 3600,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Like [`parse_env`], but values outside `0..=MAX_WINDOW_HOURS` also fall
/// back to `default`.
fn parse_hours(key: &str, default: i64) -> i64 {
    Some(parse_env(key, default))
        .filter(|hours| (0..=MAX_WINDOW_HOURS).contains(hours))
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_env_falls_back_when_unset() {
        // Unlikely to be set in any test environment.
        assert_eq!(parse_env("DUO_TEST_UNSET_NUMBER", 7_i64), 7);
    }

    #[test]
    fn default_generates_a_uuid() {
        let cfg = Config::default();
        assert!(Uuid::parse_str(&cfg.app_uuid).is_ok());
        assert_eq!(cfg.retention_hours, 168);
    }

    #[test]
    fn out_of_range_hours_fall_back_to_default() {
        // SAFETY: the key is unique to this test, nothing else reads it.
        unsafe { std::env::set_var("DUO_TEST_HOURS", "-5") };
        assert_eq!(parse_hours("DUO_TEST_HOURS", 24), 24);

        unsafe { std::env::set_var("DUO_TEST_HOURS", "10000000000") };
        assert_eq!(parse_hours("DUO_TEST_HOURS", 24), 24);

        unsafe { std::env::set_var("DUO_TEST_HOURS", "0") };
        assert_eq!(parse_hours("DUO_TEST_HOURS", 24), 0);

        unsafe { std::env::set_var("DUO_TEST_HOURS", "48") };
        assert_eq!(parse_hours("DUO_TEST_HOURS", 24), 48);

        unsafe { std::env::remove_var("DUO_TEST_HOURS") };
        assert_eq!(parse_hours("DUO_TEST_HOURS", 24), 24);
    }
}
