//! The ingestion pipeline: fetch → normalize → write, one page at a time.
//!
//! The cursor is persisted only after a page's writes have landed, so a
//! crash or budget stop never loses committed progress and a replayed page
//! is absorbed by the idempotent upsert (at-least-once delivery).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use mentionwatch_common::{Config, IngestError};
use mentionwatch_store::{MentionStore, INGEST_PIPELINE};

use crate::budget::RunBudget;
use crate::normalizer::Normalizer;
use crate::stats::IngestStats;
use crate::traits::MentionFetcher;
use crate::writer::StoreWriter;

/// Observable phases of one invocation. `Fetching` is re-entered per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Normalizing,
    Writing,
    Done,
    Failed,
}

/// Outcome of one invocation. On `Failed` the cursor is left at the last
/// committed page, so the next scheduled run resumes rather than restarts.
pub struct RunReport {
    pub state: RunState,
    pub stats: IngestStats,
    pub error: Option<IngestError>,
}

pub struct Pipeline {
    fetcher: Arc<dyn MentionFetcher>,
    store: Arc<dyn MentionStore>,
    writer: StoreWriter,
    normalizer: Normalizer,
    max_pages: u32,
    wall_clock: Duration,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn MentionFetcher>,
        store: Arc<dyn MentionStore>,
        config: &Config,
    ) -> Self {
        Self {
            fetcher,
            writer: StoreWriter::new(store.clone()),
            store,
            normalizer: Normalizer::new(config.retention_days, config.content_max_len),
            max_pages: config.max_pages_per_run,
            wall_clock: Duration::from_secs(config.run_budget_secs),
        }
    }

    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let mut stats = IngestStats::default();
        let mut state = RunState::Idle;

        info!(run_id = %run_id, "Ingest run starting");

        let mut cursor = match self.store.load_cursor(INGEST_PIPELINE).await {
            Ok(cursor) => cursor,
            Err(e) => return failed(stats, e),
        };
        if let Some(c) = cursor.as_deref() {
            stats.resumed_from_cursor = true;
            info!(cursor = c, "Resuming from saved cursor");
        }

        let mut budget = RunBudget::new(self.wall_clock, self.max_pages);

        loop {
            if let Some(reason) = budget.exhausted() {
                info!(reason, "Fetch budget exhausted, stopping with cursor saved");
                advance(&mut state, RunState::Done);
                break;
            }

            advance(&mut state, RunState::Fetching);
            let page = match self.fetcher.pull(cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    error!(error = %e, "Fetch failed, ending run at last committed page");
                    return failed(stats, e);
                }
            };
            budget.record_page();
            stats.pages_fetched += 1;
            stats.mentions_fetched += page.records.len() as u32;

            advance(&mut state, RunState::Normalizing);
            let now = Utc::now();
            let mut batch = Vec::with_capacity(page.records.len());
            for raw in &page.records {
                match self.normalizer.transform(raw, now) {
                    Ok(mention) => batch.push(mention),
                    Err(e) => {
                        warn!(id = ?raw.id, error = %e, "Skipping invalid mention");
                        stats.mentions_skipped += 1;
                    }
                }
            }
            stats.mentions_normalized += batch.len() as u32;

            advance(&mut state, RunState::Writing);
            if !batch.is_empty() {
                match self.writer.write_batch(&batch, now).await {
                    Ok(outcome) => {
                        stats.mentions_written += outcome.stored;
                        stats.write_failures += outcome.failed;
                    }
                    Err(e) => {
                        error!(error = %e, "Write failed, ending run at last committed page");
                        return failed(stats, e);
                    }
                }
            }

            // Page committed: advance the persisted cursor.
            cursor = page.next_cursor;
            if let Err(e) = self
                .store
                .save_cursor(INGEST_PIPELINE, cursor.as_deref())
                .await
            {
                error!(error = %e, "Cursor save failed");
                return failed(stats, e);
            }

            if cursor.is_none() {
                advance(&mut state, RunState::Done);
                break;
            }
        }

        debug_assert_eq!(state, RunState::Done);

        // Expiry sweep. A sweep failure doesn't fail an otherwise good run;
        // the next invocation sweeps again.
        match self.store.reap_expired(Utc::now()).await {
            Ok(reaped) => stats.mentions_reaped = reaped,
            Err(e) => warn!(error = %e, "Expiry sweep failed, will retry next run"),
        }

        info!(run_id = %run_id, "Ingest run complete");
        RunReport {
            state,
            stats,
            error: None,
        }
    }
}

fn advance(state: &mut RunState, next: RunState) {
    *state = next;
    tracing::trace!(state = ?next, "Pipeline phase");
}

fn failed(stats: IngestStats, error: IngestError) -> RunReport {
    RunReport {
        state: RunState::Failed,
        stats,
        error: Some(error),
    }
}
