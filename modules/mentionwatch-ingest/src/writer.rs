//! StoreWriter — batched upserts with bounded retry on throttling.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::warn;

use mentionwatch_common::{IngestError, Mention};
use mentionwatch_store::{BatchOutcome, MentionStore};

/// Total attempts per batch, counting the first.
const WRITE_MAX_ATTEMPTS: u32 = 3;
/// Base backoff duration. Actual delay is base * 2^attempt + jitter.
const WRITE_RETRY_BASE: Duration = Duration::from_millis(500);

pub struct StoreWriter {
    store: Arc<dyn MentionStore>,
    max_attempts: u32,
}

impl StoreWriter {
    pub fn new(store: Arc<dyn MentionStore>) -> Self {
        Self {
            store,
            max_attempts: WRITE_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Write a batch of canonical mentions.
    ///
    /// Records whose ttl is already in the past at write time are skipped
    /// as per-record validation failures, never stored. Throttling is
    /// retried with backoff; when the batch path stays throttled, falls
    /// back to single-item writes. Schema and auth failures are fatal.
    pub async fn write_batch(
        &self,
        mentions: &[Mention],
        now: DateTime<Utc>,
    ) -> Result<BatchOutcome, IngestError> {
        let mut outcome = BatchOutcome::default();

        let live: Vec<Mention> = mentions
            .iter()
            .filter(|m| {
                if m.is_live(now) {
                    true
                } else {
                    warn!(
                        mention_id = m.mention_id.as_str(),
                        ttl = m.ttl,
                        "Skipping mention with stale ttl"
                    );
                    outcome.failed += 1;
                    false
                }
            })
            .cloned()
            .collect();

        if live.is_empty() {
            return Ok(outcome);
        }

        match self.retried(|| self.store.batch_upsert(&live)).await {
            Ok(batch) => {
                outcome.stored += batch.stored;
                outcome.failed += batch.failed;
                Ok(outcome)
            }
            Err(e) if e.is_transient() => {
                // Batch path stayed throttled; land what we can one at a time.
                warn!(error = %e, "Batch write exhausted retries, falling back to single-item writes");
                for mention in &live {
                    self.retried(|| self.store.upsert(mention)).await?;
                    outcome.stored += 1;
                }
                Ok(outcome)
            }
            Err(e) => Err(e),
        }
    }

    /// Run a store operation with bounded backoff on transient failures.
    async fn retried<T, F, Fut>(&self, op: F) -> Result<T, IngestError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, IngestError>>,
    {
        let mut attempt = 0;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            attempt += 1;
            if !err.is_transient() || attempt >= self.max_attempts {
                return Err(err);
            }

            let backoff = match err.retry_after_secs() {
                Some(secs) => Duration::from_secs(secs),
                None => WRITE_RETRY_BASE * 2u32.pow(attempt - 1),
            };
            let jitter = Duration::from_millis(rand::rng().random_range(0..250));
            warn!(
                attempt,
                max_attempts = self.max_attempts,
                backoff_ms = backoff.as_millis() as u64,
                error = %err,
                "Transient store failure, retrying after backoff"
            );
            tokio::time::sleep(backoff + jitter).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentionwatch_store::MemoryMentionStore;

    fn mention(id: &str, ttl_offset_secs: i64) -> Mention {
        let now = Utc::now().timestamp();
        Mention {
            mention_id: id.to_string(),
            timestamp: now - 60,
            source: "twitter".into(),
            content: "body".into(),
            url: String::new(),
            author: String::new(),
            title: String::new(),
            keywords: String::new(),
            sentiment: "neutral".into(),
            ttl: now + ttl_offset_secs,
        }
    }

    #[tokio::test]
    async fn writes_a_clean_batch() {
        let store = Arc::new(MemoryMentionStore::new());
        let writer = StoreWriter::new(store.clone());

        let outcome = writer
            .write_batch(&[mention("m-1", 3600), mention("m-2", 3600)], Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.stored, 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn stale_ttl_is_skipped_not_stored() {
        let store = Arc::new(MemoryMentionStore::new());
        let writer = StoreWriter::new(store.clone());

        let outcome = writer
            .write_batch(&[mention("m-live", 3600), mention("m-stale", -10)], Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.stored, 1);
        assert_eq!(outcome.failed, 1);
        assert!(store.get("m-stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn throttled_batch_is_retried_until_it_lands() {
        let store = Arc::new(MemoryMentionStore::new());
        store.throttle_next_batches(1);
        let writer = StoreWriter::new(store.clone());

        let outcome = writer
            .write_batch(&[mention("m-1", 3600)], Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.stored, 1);
        assert_eq!(store.batch_calls(), 2, "one throttled call, one retry");
    }

    #[tokio::test]
    async fn persistent_throttle_falls_back_to_single_writes() {
        let store = Arc::new(MemoryMentionStore::new());
        store.throttle_next_batches(10);
        let writer = StoreWriter::new(store.clone()).with_max_attempts(2);

        let outcome = writer
            .write_batch(&[mention("m-1", 3600), mention("m-2", 3600)], Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.stored, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.batch_calls(), 2, "batch path exhausted before fallback");
    }
}
