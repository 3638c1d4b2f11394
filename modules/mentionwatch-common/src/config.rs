use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
/// Read once at startup; there is no hot-reload.
#[derive(Debug, Clone)]
pub struct Config {
    // MentionMind API
    pub mentionmind_base_url: String,
    pub mentionmind_api_key: String,

    // Postgres
    pub database_url: String,

    // Retention and sanitization
    pub retention_days: i64,
    pub content_max_len: usize,

    // Per-invocation budgets
    pub max_pages_per_run: u32,
    pub run_budget_secs: u64,
    pub page_limit: u32,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            mentionmind_base_url: env::var("MENTIONMIND_BASE_URL")
                .unwrap_or_else(|_| "https://api.mentionmind.com/v1".to_string()),
            mentionmind_api_key: required_env("MENTIONMIND_API_KEY"),
            database_url: required_env("DATABASE_URL"),
            retention_days: parsed_env("RETENTION_DAYS", 30),
            content_max_len: parsed_env("CONTENT_MAX_LEN", 4096),
            max_pages_per_run: parsed_env("MAX_PAGES_PER_RUN", 10),
            run_budget_secs: parsed_env("RUN_BUDGET_SECS", 300),
            page_limit: parsed_env("PAGE_LIMIT", 100),
        }
    }

    /// Log the active configuration without leaking secrets.
    pub fn log_redacted(&self) {
        info!(
            base_url = self.mentionmind_base_url.as_str(),
            retention_days = self.retention_days,
            content_max_len = self.content_max_len,
            max_pages_per_run = self.max_pages_per_run,
            run_budget_secs = self.run_budget_secs,
            page_limit = self.page_limit,
            "Config loaded (api key and database url redacted)"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got '{raw}'")),
        Err(_) => default,
    }
}
