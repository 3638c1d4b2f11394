//! PgMentionStore — mentions store backed by Postgres.
//!
//! One row per `mention_id` with `(source, ts)` indexed for per-platform
//! range reads. TTL is an epoch-seconds column enforced by `reap_expired`;
//! Postgres has no native attribute TTL, so the pipeline runs the sweep at
//! the end of each invocation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use mentionwatch_common::{IngestError, Mention};

use crate::traits::{BatchOutcome, MentionStore};

/// Rows per multi-row INSERT. Matches the batch ceiling of managed
/// key-value stores this schema is modeled on.
const WRITE_CHUNK: usize = 25;

#[derive(Clone)]
pub struct PgMentionStore {
    pool: PgPool,
}

impl PgMentionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, IngestError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(map_store_err)?;
        Ok(Self { pool })
    }

    /// Create tables and indexes if they don't exist. Idempotent.
    pub async fn migrate(&self) -> Result<(), IngestError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mentions (
                mention_id TEXT PRIMARY KEY,
                ts         BIGINT NOT NULL,
                source     TEXT NOT NULL,
                content    TEXT NOT NULL,
                url        TEXT NOT NULL DEFAULT '',
                author     TEXT NOT NULL DEFAULT '',
                title      TEXT NOT NULL DEFAULT '',
                keywords   TEXT NOT NULL DEFAULT '',
                sentiment  TEXT NOT NULL DEFAULT 'neutral',
                ttl        BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS source_timestamp_index ON mentions (source, ts)",
        )
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ingest_cursors (
                pipeline   TEXT PRIMARY KEY,
                cursor     TEXT,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        info!("Mention store migrations complete");
        Ok(())
    }
}

#[async_trait]
impl MentionStore for PgMentionStore {
    async fn upsert(&self, mention: &Mention) -> Result<(), IngestError> {
        sqlx::query(
            r#"
            INSERT INTO mentions
                (mention_id, ts, source, content, url, author, title, keywords, sentiment, ttl)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (mention_id) DO UPDATE SET
                ts = EXCLUDED.ts,
                source = EXCLUDED.source,
                content = EXCLUDED.content,
                url = EXCLUDED.url,
                author = EXCLUDED.author,
                title = EXCLUDED.title,
                keywords = EXCLUDED.keywords,
                sentiment = EXCLUDED.sentiment,
                ttl = EXCLUDED.ttl
            "#,
        )
        .bind(&mention.mention_id)
        .bind(mention.timestamp)
        .bind(&mention.source)
        .bind(&mention.content)
        .bind(&mention.url)
        .bind(&mention.author)
        .bind(&mention.title)
        .bind(&mention.keywords)
        .bind(&mention.sentiment)
        .bind(mention.ttl)
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;

        debug!(mention_id = mention.mention_id.as_str(), "Stored mention");
        Ok(())
    }

    async fn batch_upsert(&self, mentions: &[Mention]) -> Result<BatchOutcome, IngestError> {
        let mut outcome = BatchOutcome::default();
        for chunk in mentions.chunks(WRITE_CHUNK) {
            for mention in chunk {
                self.upsert(mention).await?;
                outcome.stored += 1;
            }
        }
        Ok(outcome)
    }

    async fn get(&self, mention_id: &str) -> Result<Option<Mention>, IngestError> {
        let row = sqlx::query_as::<_, MentionRow>(
            r#"
            SELECT mention_id, ts, source, content, url, author, title, keywords, sentiment, ttl
            FROM mentions
            WHERE mention_id = $1
            "#,
        )
        .bind(mention_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(row.map(Mention::from))
    }

    async fn query_by_source(
        &self,
        source: &str,
        start_ts: Option<i64>,
        end_ts: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Mention>, IngestError> {
        let rows = sqlx::query_as::<_, MentionRow>(
            r#"
            SELECT mention_id, ts, source, content, url, author, title, keywords, sentiment, ttl
            FROM mentions
            WHERE source = $1
              AND ($2::BIGINT IS NULL OR ts >= $2)
              AND ($3::BIGINT IS NULL OR ts <= $3)
            ORDER BY ts DESC
            LIMIT $4
            "#,
        )
        .bind(source)
        .bind(start_ts)
        .bind(end_ts)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_store_err)?;

        Ok(rows.into_iter().map(Mention::from).collect())
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> Result<u64, IngestError> {
        let result = sqlx::query("DELETE FROM mentions WHERE ttl <= $1")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(map_store_err)?;

        let reaped = result.rows_affected();
        if reaped > 0 {
            info!(reaped, "Reaped expired mentions");
        }
        Ok(reaped)
    }

    async fn load_cursor(&self, pipeline: &str) -> Result<Option<String>, IngestError> {
        let row = sqlx::query("SELECT cursor FROM ingest_cursors WHERE pipeline = $1")
            .bind(pipeline)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_store_err)?;

        Ok(row.and_then(|r| r.get::<Option<String>, _>("cursor")))
    }

    async fn save_cursor(&self, pipeline: &str, cursor: Option<&str>) -> Result<(), IngestError> {
        sqlx::query(
            r#"
            INSERT INTO ingest_cursors (pipeline, cursor, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (pipeline) DO UPDATE SET
                cursor = EXCLUDED.cursor,
                updated_at = now()
            "#,
        )
        .bind(pipeline)
        .bind(cursor)
        .execute(&self.pool)
        .await
        .map_err(map_store_err)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct MentionRow {
    mention_id: String,
    ts: i64,
    source: String,
    content: String,
    url: String,
    author: String,
    title: String,
    keywords: String,
    sentiment: String,
    ttl: i64,
}

impl From<MentionRow> for Mention {
    fn from(row: MentionRow) -> Self {
        Mention {
            mention_id: row.mention_id,
            timestamp: row.ts,
            source: row.source,
            content: row.content,
            url: row.url,
            author: row.author,
            title: row.title,
            keywords: row.keywords,
            sentiment: row.sentiment,
            ttl: row.ttl,
        }
    }
}

/// Map sqlx failures onto the ingest taxonomy: resource exhaustion and
/// connection trouble are retryable, schema and auth problems are not.
fn map_store_err(err: sqlx::Error) -> IngestError {
    match &err {
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.to_string()).unwrap_or_default();
            // 53xxx insufficient resources, 40001/40P01 serialization/deadlock,
            // 57014 cancelled: all worth a backoff retry.
            if code.starts_with("53") || code.starts_with("40") || code == "57014" {
                IngestError::StoreCapacity(db.message().to_string())
            } else if code.starts_with("28") {
                IngestError::Auth(db.message().to_string())
            } else {
                IngestError::StoreSchema(db.message().to_string())
            }
        }
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            IngestError::TransientNetwork(err.to_string())
        }
        _ => IngestError::StoreSchema(err.to_string()),
    }
}
