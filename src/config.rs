//! Minimal runtime configuration helpers.
//! Defaults match the backend's development server (localhost:5000).

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_POLL_SECS: u64 = 5;
pub const DEFAULT_COMMAND_RECONCILE_MS: u64 = 500;
pub const DEFAULT_SCHEDULER_RECONCILE_MS: u64 = 1000;
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// Status polling cadence in watch mode.
    pub poll_interval: Duration,
    /// Wait between an accepted device command and its follow-up status
    /// fetch. The backend applies device writes asynchronously relative to
    /// its HTTP response.
    pub command_reconcile_delay: Duration,
    /// Same, for scheduler start/stop (the process takes longer to settle).
    pub scheduler_reconcile_delay: Duration,
    pub notification_ttl: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("AC_API_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Config {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(env_u64("AC_POLL_INTERVAL_SECS", DEFAULT_POLL_SECS)),
            command_reconcile_delay: Duration::from_millis(env_u64(
                "AC_COMMAND_RECONCILE_MS",
                DEFAULT_COMMAND_RECONCILE_MS,
            )),
            scheduler_reconcile_delay: Duration::from_millis(env_u64(
                "AC_SCHEDULER_RECONCILE_MS",
                DEFAULT_SCHEDULER_RECONCILE_MS,
            )),
            notification_ttl: Duration::from_secs(env_u64(
                "AC_NOTIFICATION_TTL_SECS",
                DEFAULT_NOTIFICATION_TTL_SECS,
            )),
            request_timeout: Duration::from_secs(env_u64(
                "AC_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
