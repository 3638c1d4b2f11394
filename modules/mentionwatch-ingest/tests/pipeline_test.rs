//! End-to-end pipeline tests against scripted fetcher and in-memory store.

use std::sync::Arc;

use chrono::Utc;
use mentionwatch_common::Mention;
use mentionwatch_ingest::testing::{raw_mention, test_config, MockFetcher, ScriptedPull};
use mentionwatch_ingest::{Pipeline, RunState};
use mentionwatch_store::{MemoryMentionStore, MentionStore, INGEST_PIPELINE};

const DATE: &str = "2026-02-14 09:30:00";

#[tokio::test]
async fn three_pages_then_done() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_pull(None, vec![raw_mention("m-1", DATE)], Some("p2"))
            .on_pull(Some("p2"), vec![raw_mention("m-2", DATE)], Some("p3"))
            .on_pull(Some("p3"), vec![raw_mention("m-3", DATE)], None),
    );
    let store = Arc::new(MemoryMentionStore::new());

    let pipeline = Pipeline::new(fetcher.clone(), store.clone(), &test_config());
    let report = pipeline.run().await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(fetcher.calls().len(), 3, "exactly one pull per page");
    assert_eq!(report.stats.pages_fetched, 3);
    assert_eq!(report.stats.mentions_written, 3);
    assert_eq!(store.len(), 3);
    assert!(
        store.load_cursor(INGEST_PIPELINE).await.unwrap().is_none(),
        "cursor cleared after the listing is exhausted"
    );
}

#[tokio::test]
async fn invalid_records_are_skipped_not_fatal() {
    let mut no_id = raw_mention("ignored", DATE);
    no_id.id = None;
    let mut bad_date = raw_mention("m-bad-date", DATE);
    bad_date.date_added = Some("last tuesday".into());

    let fetcher = Arc::new(MockFetcher::new().on_pull(
        None,
        vec![no_id, raw_mention("m-good", DATE), bad_date],
        None,
    ));
    let store = Arc::new(MemoryMentionStore::new());

    let report = Pipeline::new(fetcher, store.clone(), &test_config())
        .run()
        .await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.stats.mentions_fetched, 3);
    assert_eq!(report.stats.mentions_skipped, 2);
    assert_eq!(report.stats.mentions_written, 1);
    assert!(store.get("m-good").await.unwrap().is_some());
}

#[tokio::test]
async fn fetch_failure_preserves_last_committed_cursor() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_pull(None, vec![raw_mention("m-1", DATE)], Some("p2"))
            .fail_at(Some("p2"), ScriptedPull::Throttle),
    );
    let store = Arc::new(MemoryMentionStore::new());

    let report = Pipeline::new(fetcher, store.clone(), &test_config())
        .run()
        .await;

    assert_eq!(report.state, RunState::Failed);
    assert!(report.error.is_some());
    // Page 1 committed before the failure; the saved cursor points at the
    // page that never landed.
    assert!(store.get("m-1").await.unwrap().is_some());
    assert_eq!(
        store.load_cursor(INGEST_PIPELINE).await.unwrap().as_deref(),
        Some("p2")
    );
}

#[tokio::test]
async fn resumes_from_saved_cursor_without_refetching() {
    let store = Arc::new(MemoryMentionStore::new());
    store
        .save_cursor(INGEST_PIPELINE, Some("p2"))
        .await
        .unwrap();

    // Only the remaining page is scripted; pulling from the start would fail.
    let fetcher = Arc::new(MockFetcher::new().on_pull(
        Some("p2"),
        vec![raw_mention("m-2", DATE)],
        None,
    ));

    let report = Pipeline::new(fetcher.clone(), store.clone(), &test_config())
        .run()
        .await;

    assert_eq!(report.state, RunState::Done);
    assert!(report.stats.resumed_from_cursor);
    assert_eq!(fetcher.calls(), vec![Some("p2".to_string())]);
    assert!(store.get("m-2").await.unwrap().is_some());
}

#[tokio::test]
async fn page_budget_stops_the_run_with_cursor_saved() {
    let fetcher = Arc::new(
        MockFetcher::new().on_pull(None, vec![raw_mention("m-1", DATE)], Some("p2")),
    );
    let store = Arc::new(MemoryMentionStore::new());

    let mut config = test_config();
    config.max_pages_per_run = 1;

    let report = Pipeline::new(fetcher.clone(), store.clone(), &config)
        .run()
        .await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(fetcher.calls().len(), 1);
    assert_eq!(
        store.load_cursor(INGEST_PIPELINE).await.unwrap().as_deref(),
        Some("p2"),
        "next run resumes at the unfetched page"
    );
}

#[tokio::test]
async fn auth_failure_is_terminal() {
    let fetcher = Arc::new(MockFetcher::new().fail_at(None, ScriptedPull::AuthFail));
    let store = Arc::new(MemoryMentionStore::new());

    let report = Pipeline::new(fetcher, store, &test_config()).run().await;
    assert_eq!(report.state, RunState::Failed);
    assert_eq!(report.stats.mentions_written, 0);
}

#[tokio::test]
async fn expiry_sweep_runs_after_a_successful_run() {
    let store = Arc::new(MemoryMentionStore::new());
    let now = Utc::now().timestamp();
    store
        .upsert(&Mention {
            mention_id: "m-expired".into(),
            timestamp: now - 86_400,
            source: "news".into(),
            content: "old".into(),
            url: String::new(),
            author: String::new(),
            title: String::new(),
            keywords: String::new(),
            sentiment: "neutral".into(),
            ttl: now - 1,
        })
        .await
        .unwrap();

    let fetcher = Arc::new(MockFetcher::new().on_pull(None, vec![], None));
    let report = Pipeline::new(fetcher, store.clone(), &test_config())
        .run()
        .await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.stats.mentions_reaped, 1);
    assert!(store.get("m-expired").await.unwrap().is_none());
}

#[tokio::test]
async fn refetched_page_is_absorbed_idempotently() {
    // Same page ingested twice (at-least-once delivery): one stored record.
    let store = Arc::new(MemoryMentionStore::new());
    for _ in 0..2 {
        let fetcher = Arc::new(
            MockFetcher::new().on_pull(None, vec![raw_mention("m-1", DATE)], None),
        );
        let report = Pipeline::new(fetcher, store.clone(), &test_config())
            .run()
            .await;
        assert_eq!(report.state, RunState::Done);
    }
    assert_eq!(store.len(), 1);
}
