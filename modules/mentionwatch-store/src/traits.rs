// Trait abstraction over the mention store.
//
// The production implementation is PgMentionStore; MemoryMentionStore backs
// deterministic tests: no network, no database, no Docker.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mentionwatch_common::{IngestError, Mention};

/// Result of a batched write. Per-item failures are isolated so one bad
/// record never sinks the rest of the chunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchOutcome {
    pub stored: u32,
    pub failed: u32,
}

#[async_trait]
pub trait MentionStore: Send + Sync {
    /// Insert-or-update keyed by `mention_id`. Idempotent: re-writing the
    /// same record leaves the store unchanged; differing non-key fields are
    /// last-write-wins.
    async fn upsert(&self, mention: &Mention) -> Result<(), IngestError>;

    /// Upsert a batch in store-native chunks. Fails the whole call only on
    /// a store-level error (throttling, schema); the caller owns retry.
    async fn batch_upsert(&self, mentions: &[Mention]) -> Result<BatchOutcome, IngestError>;

    /// Point read by primary key.
    async fn get(&self, mention_id: &str) -> Result<Option<Mention>, IngestError>;

    /// Range read over the (source, timestamp) secondary index,
    /// newest first.
    async fn query_by_source(
        &self,
        source: &str,
        start_ts: Option<i64>,
        end_ts: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Mention>, IngestError>;

    /// Remove records whose `ttl` has passed. Returns the count removed.
    /// This sweep is the only delete path for mentions.
    async fn reap_expired(&self, now: DateTime<Utc>) -> Result<u64, IngestError>;

    /// Load the persisted resumption cursor for `pipeline`.
    async fn load_cursor(&self, pipeline: &str) -> Result<Option<String>, IngestError>;

    /// Persist (or clear, with `None`) the resumption cursor for `pipeline`.
    async fn save_cursor(&self, pipeline: &str, cursor: Option<&str>) -> Result<(), IngestError>;
}
