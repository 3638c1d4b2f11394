pub mod error;
pub mod types;

pub use error::{MentionMindError, Result};
pub use types::{MentionsPage, RawMention, TokenResponse};

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://api.mentionmind.com/v1";

/// Per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Total attempts per call, counting the first. Transient failures only.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base backoff duration. Actual delay is base * 2^attempt + jitter,
/// unless the API supplies a Retry-After hint.
const RETRY_BASE: Duration = Duration::from_millis(500);

/// Refresh the session token this many seconds before it expires.
const TOKEN_REFRESH_BUFFER_SECS: i64 = 300;

#[derive(Debug, Clone)]
struct SessionToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - chrono::Duration::seconds(TOKEN_REFRESH_BUFFER_SECS) > now
    }
}

/// Client for the MentionMind mentions API.
///
/// Auth is a two-step: the long-lived API key buys a short-lived session
/// token, which is sent as a bearer header on every mentions call. The
/// token is cached and refreshed shortly before expiry.
pub struct MentionMindClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_attempts: u32,
    token: Mutex<Option<SessionToken>>,
}

impl MentionMindClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            token: Mutex::new(None),
        }
    }

    /// Override the API endpoint. Used by tests against a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the transient-failure attempt ceiling.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Fetch one page of mentions, resuming from `cursor` if given.
    ///
    /// Retries transient failures (network errors, 5xx, 429) with
    /// exponential backoff plus jitter, honoring `Retry-After` when the API
    /// sends one. Auth errors and malformed responses fail immediately.
    pub async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<MentionsPage> {
        let url = format!("{}/mentions", self.base_url);

        let mut attempt = 0;
        loop {
            let token = self.bearer_token().await?;

            let mut req = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .timeout(DEFAULT_TIMEOUT)
                .query(&[("limit", limit.to_string())]);
            if let Some(cursor) = cursor {
                req = req.query(&[("cursor", cursor)]);
            }

            let err = match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let body = resp.text().await?;
                        let page: MentionsPage = serde_json::from_str(&body)?;
                        debug!(
                            count = page.mentions.len(),
                            has_next = page.next_cursor.is_some(),
                            "Fetched mentions page"
                        );
                        return Ok(page);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        MentionMindError::RateLimited {
                            retry_after_secs: retry_after_hint(&resp),
                        }
                    } else if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(MentionMindError::Auth(format!(
                            "mentions request rejected ({status}): {body}"
                        )));
                    } else {
                        let body = resp.text().await.unwrap_or_default();
                        MentionMindError::Api {
                            status: status.as_u16(),
                            message: body,
                        }
                    }
                }
                Err(e) => e.into(),
            };

            attempt += 1;
            if !err.is_transient() || attempt >= self.max_attempts {
                return Err(err);
            }

            let backoff = match err {
                MentionMindError::RateLimited {
                    retry_after_secs: Some(secs),
                } => Duration::from_secs(secs),
                _ => RETRY_BASE * 2u32.pow(attempt - 1),
            };
            let jitter = Duration::from_millis(rand::rng().random_range(0..250));
            warn!(
                attempt,
                max_attempts = self.max_attempts,
                backoff_ms = backoff.as_millis() as u64,
                error = %err,
                "Transient mentions fetch failure, retrying after backoff"
            );
            tokio::time::sleep(backoff + jitter).await;
        }
    }

    /// Return a usable session token, refreshing it if missing or near expiry.
    async fn bearer_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        let now = Utc::now();
        if let Some(cached) = guard.as_ref() {
            if cached.is_usable(now) {
                return Ok(cached.token.clone());
            }
        }

        let refreshed = self.refresh_token(now).await?;
        let token = refreshed.token.clone();
        *guard = Some(refreshed);
        Ok(token)
    }

    /// Exchange the API key for a fresh session token. A refresh failure is
    /// always fatal: either the key is bad or the auth endpoint is down, and
    /// neither is worth burning the fetch retry budget on.
    async fn refresh_token(&self, now: DateTime<Utc>) -> Result<SessionToken> {
        let url = format!("{}/auth/token", self.base_url);
        let resp = self
            .client
            .post(&url)
            .timeout(DEFAULT_TIMEOUT)
            .json(&serde_json::json!({ "apiKey": self.api_key }))
            .send()
            .await
            .map_err(|e| MentionMindError::Auth(format!("token refresh failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MentionMindError::Auth(format!(
                "token refresh rejected ({status}): {body}"
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| MentionMindError::Auth(format!("malformed token response: {e}")))?;

        info!(expires_in = token.expires_in, "Session token refreshed");
        Ok(SessionToken {
            token: token.token,
            expires_at: now + chrono::Duration::seconds(token.expires_in as i64),
        })
    }
}

fn retry_after_hint(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
