use std::env;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote jobs API, e.g. `https://jobs.example.com`.
    pub api_base_url: String,

    /// Items requested per page.
    pub page_size: u32,

    /// Quiet period before a filter keystroke burst is considered settled.
    pub debounce: Duration,

    /// Per-request network timeout.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            api_base_url: required_env("API_BASE_URL"),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("PAGE_SIZE must be a number"),
            debounce: Duration::from_millis(
                env::var("DEBOUNCE_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .expect("DEBOUNCE_MS must be a number"),
            ),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("REQUEST_TIMEOUT_SECS must be a number"),
            ),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
