use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical mention record, the unit of storage.
///
/// `mention_id` is assigned by the source API and is the partition key;
/// `timestamp` is the sort key. Records may arrive out of order. Every
/// record carries a `ttl` after which the store's expiry sweep reclaims it;
/// there is no explicit delete path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub mention_id: String,
    /// Epoch seconds, as reported by the source.
    pub timestamp: i64,
    /// Platform of origin, lowercased (e.g. "twitter", "reddit", "news").
    pub source: String,
    /// Sanitized body: control characters stripped, whitespace collapsed,
    /// truncated to the configured max length.
    pub content: String,
    pub url: String,
    pub author: String,
    pub title: String,
    pub keywords: String,
    pub sentiment: String,
    /// Epoch seconds after which the record is eligible for removal.
    pub ttl: i64,
}

impl Mention {
    /// Whether the record is still within its retention window at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.ttl > now.timestamp()
    }
}
