//! Test doubles for the pipeline.
//!
//! MockFetcher scripts pages (or failures) per cursor value and records
//! every pull, so tests can assert exactly which pages a run touched.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use mentionmind_client::RawMention;
use mentionwatch_common::{Config, IngestError};

use crate::traits::{FetchPage, MentionFetcher};

/// What a scripted cursor position should return.
pub enum ScriptedPull {
    Page(FetchPage),
    Throttle,
    AuthFail,
}

#[derive(Default)]
pub struct MockFetcher {
    script: Mutex<HashMap<String, ScriptedPull>>,
    calls: Mutex<Vec<Option<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful page at `cursor` (`None` = the first pull).
    pub fn on_pull(
        self,
        cursor: Option<&str>,
        records: Vec<RawMention>,
        next_cursor: Option<&str>,
    ) -> Self {
        self.script.lock().unwrap().insert(
            key(cursor),
            ScriptedPull::Page(FetchPage {
                records,
                next_cursor: next_cursor.map(String::from),
            }),
        );
        self
    }

    /// Script a failure at `cursor`.
    pub fn fail_at(self, cursor: Option<&str>, failure: ScriptedPull) -> Self {
        self.script.lock().unwrap().insert(key(cursor), failure);
        self
    }

    /// Every cursor this fetcher was pulled with, in order.
    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MentionFetcher for MockFetcher {
    async fn pull(&self, cursor: Option<&str>) -> Result<FetchPage, IngestError> {
        self.calls.lock().unwrap().push(cursor.map(String::from));

        let script = self.script.lock().unwrap();
        match script.get(&key(cursor)) {
            Some(ScriptedPull::Page(page)) => Ok(page.clone()),
            Some(ScriptedPull::Throttle) => Err(IngestError::RateLimited {
                retry_after_secs: Some(1),
            }),
            Some(ScriptedPull::AuthFail) => {
                Err(IngestError::Auth("scripted auth failure".into()))
            }
            None => Err(IngestError::Anyhow(anyhow::anyhow!(
                "MockFetcher: no page scripted for cursor {cursor:?}"
            ))),
        }
    }
}

fn key(cursor: Option<&str>) -> String {
    cursor.unwrap_or("").to_string()
}

/// A well-formed raw mention for tests.
pub fn raw_mention(id: &str, date_added: &str) -> RawMention {
    RawMention {
        id: Some(id.to_string()),
        date_added: Some(date_added.to_string()),
        source: Some("twitter".into()),
        snippet: Some(format!("snippet for {id}")),
        ..Default::default()
    }
}

/// Config for pipeline tests; the database url is never dialed because
/// tests run against MemoryMentionStore.
pub fn test_config() -> Config {
    Config {
        mentionmind_base_url: "http://unused.test".into(),
        mentionmind_api_key: "test-key".into(),
        database_url: "postgres://unused".into(),
        retention_days: 30,
        content_max_len: 4096,
        max_pages_per_run: 10,
        run_budget_secs: 60,
        page_limit: 100,
    }
}
