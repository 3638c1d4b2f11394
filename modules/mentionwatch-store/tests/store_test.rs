//! Store semantics tests against the in-memory implementation.

use chrono::{Duration, Utc};
use mentionwatch_common::Mention;
use mentionwatch_store::{MemoryMentionStore, MentionStore, INGEST_PIPELINE};

fn mention(id: &str, source: &str, ts: i64) -> Mention {
    Mention {
        mention_id: id.to_string(),
        timestamp: ts,
        source: source.to_string(),
        content: format!("content for {id}"),
        url: String::new(),
        author: String::new(),
        title: String::new(),
        keywords: String::new(),
        sentiment: "neutral".to_string(),
        ttl: Utc::now().timestamp() + 86_400,
    }
}

#[tokio::test]
async fn upsert_is_idempotent() {
    let store = MemoryMentionStore::new();
    let m = mention("m-1", "twitter", 1000);

    store.upsert(&m).await.unwrap();
    store.upsert(&m).await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("m-1").await.unwrap().unwrap(), m);
}

#[tokio::test]
async fn rewrite_is_last_write_wins() {
    let store = MemoryMentionStore::new();
    store.upsert(&mention("m-1", "twitter", 1000)).await.unwrap();

    let mut fresher = mention("m-1", "twitter", 2000);
    fresher.content = "updated content".to_string();
    store.upsert(&fresher).await.unwrap();

    let stored = store.get("m-1").await.unwrap().unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(stored.timestamp, 2000);
    assert_eq!(stored.content, "updated content");
}

#[tokio::test]
async fn query_by_source_respects_range_and_order() {
    let store = MemoryMentionStore::new();
    store.upsert(&mention("m-1", "twitter", 100)).await.unwrap();
    store.upsert(&mention("m-2", "twitter", 300)).await.unwrap();
    store.upsert(&mention("m-3", "twitter", 200)).await.unwrap();
    store.upsert(&mention("m-4", "reddit", 250)).await.unwrap();

    let hits = store
        .query_by_source("twitter", Some(150), Some(400), 10)
        .await
        .unwrap();
    let ids: Vec<&str> = hits.iter().map(|m| m.mention_id.as_str()).collect();
    assert_eq!(ids, vec!["m-2", "m-3"], "newest first, reddit excluded");

    let capped = store.query_by_source("twitter", None, None, 2).await.unwrap();
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn reap_removes_only_expired_records() {
    let store = MemoryMentionStore::new();
    let now = Utc::now();

    let mut expired = mention("m-old", "news", 100);
    expired.ttl = (now - Duration::hours(1)).timestamp();
    let live = mention("m-new", "news", 200);

    store.upsert(&expired).await.unwrap();
    store.upsert(&live).await.unwrap();

    let reaped = store.reap_expired(now).await.unwrap();
    assert_eq!(reaped, 1);
    assert!(store.get("m-old").await.unwrap().is_none());
    assert!(store.get("m-new").await.unwrap().is_some());
}

#[tokio::test]
async fn cursor_roundtrip_and_clear() {
    let store = MemoryMentionStore::new();
    assert!(store.load_cursor(INGEST_PIPELINE).await.unwrap().is_none());

    store
        .save_cursor(INGEST_PIPELINE, Some("page-7"))
        .await
        .unwrap();
    assert_eq!(
        store.load_cursor(INGEST_PIPELINE).await.unwrap().as_deref(),
        Some("page-7")
    );

    store.save_cursor(INGEST_PIPELINE, None).await.unwrap();
    assert!(store.load_cursor(INGEST_PIPELINE).await.unwrap().is_none());
}
