//! In-memory MentionStore for deterministic tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mentionwatch_common::{IngestError, Mention};

use crate::traits::{BatchOutcome, MentionStore};

/// HashMap-backed store keyed by `mention_id`. Supports injecting
/// throttling failures to exercise the writer's retry path.
#[derive(Default)]
pub struct MemoryMentionStore {
    mentions: Mutex<HashMap<String, Mention>>,
    cursors: Mutex<HashMap<String, String>>,
    /// Remaining batch_upsert calls that should fail with StoreCapacity.
    throttle_next: AtomicU32,
    batch_calls: AtomicU32,
}

impl MemoryMentionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` batch_upsert calls fail with a throttling error.
    pub fn throttle_next_batches(&self, n: u32) {
        self.throttle_next.store(n, Ordering::SeqCst);
    }

    /// Number of batch_upsert calls observed, including throttled ones.
    pub fn batch_calls(&self) -> u32 {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.mentions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MentionStore for MemoryMentionStore {
    async fn upsert(&self, mention: &Mention) -> Result<(), IngestError> {
        self.mentions
            .lock()
            .unwrap()
            .insert(mention.mention_id.clone(), mention.clone());
        Ok(())
    }

    async fn batch_upsert(&self, mentions: &[Mention]) -> Result<BatchOutcome, IngestError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.throttle_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.throttle_next.store(remaining - 1, Ordering::SeqCst);
            return Err(IngestError::StoreCapacity(
                "injected throttle for test".into(),
            ));
        }

        let mut map = self.mentions.lock().unwrap();
        for mention in mentions {
            map.insert(mention.mention_id.clone(), mention.clone());
        }
        Ok(BatchOutcome {
            stored: mentions.len() as u32,
            failed: 0,
        })
    }

    async fn get(&self, mention_id: &str) -> Result<Option<Mention>, IngestError> {
        Ok(self.mentions.lock().unwrap().get(mention_id).cloned())
    }

    async fn query_by_source(
        &self,
        source: &str,
        start_ts: Option<i64>,
        end_ts: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Mention>, IngestError> {
        let map = self.mentions.lock().unwrap();
        let mut hits: Vec<Mention> = map
            .values()
            .filter(|m| m.source == source)
            .filter(|m| start_ts.map_or(true, |s| m.timestamp >= s))
            .filter(|m| end_ts.map_or(true, |e| m.timestamp <= e))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> Result<u64, IngestError> {
        let mut map = self.mentions.lock().unwrap();
        let before = map.len();
        map.retain(|_, m| m.ttl > now.timestamp());
        Ok((before - map.len()) as u64)
    }

    async fn load_cursor(&self, pipeline: &str) -> Result<Option<String>, IngestError> {
        Ok(self.cursors.lock().unwrap().get(pipeline).cloned())
    }

    async fn save_cursor(&self, pipeline: &str, cursor: Option<&str>) -> Result<(), IngestError> {
        let mut cursors = self.cursors.lock().unwrap();
        match cursor {
            Some(c) => {
                cursors.insert(pipeline.to_string(), c.to_string());
            }
            None => {
                cursors.remove(pipeline);
            }
        }
        Ok(())
    }
}
