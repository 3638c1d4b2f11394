//! Raw mention → canonical Mention.
//!
//! Rejections are per-record and non-fatal: the pipeline logs and skips so
//! one bad record never aborts a batch.

use chrono::{DateTime, NaiveDateTime, Utc};

use mentionmind_client::RawMention;
use mentionwatch_common::sanitize::{clean_text, normalize_source, truncate_chars};
use mentionwatch_common::{IngestError, Mention};

/// Timestamp format the API uses for `date_added`.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stored when a mention carries neither snippet nor summary.
const NO_CONTENT: &str = "[no content available]";

pub struct Normalizer {
    retention: chrono::Duration,
    max_content_len: usize,
}

impl Normalizer {
    pub fn new(retention_days: i64, max_content_len: usize) -> Self {
        Self {
            retention: chrono::Duration::days(retention_days),
            max_content_len,
        }
    }

    /// Validate and sanitize one raw mention. `now` anchors the TTL so a
    /// whole batch shares one retention deadline.
    pub fn transform(
        &self,
        raw: &RawMention,
        now: DateTime<Utc>,
    ) -> Result<Mention, IngestError> {
        let mention_id = match raw.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => return Err(IngestError::Validation("missing mention id".into())),
        };

        let date_added = raw
            .date_added
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                IngestError::Validation(format!("mention {mention_id}: missing date_added"))
            })?;
        let timestamp = NaiveDateTime::parse_from_str(date_added, DATE_FORMAT)
            .map_err(|e| {
                IngestError::Validation(format!(
                    "mention {mention_id}: bad date_added '{date_added}': {e}"
                ))
            })?
            .and_utc()
            .timestamp();

        // Content is snippet + summary, original importer behavior.
        let mut parts = Vec::new();
        if let Some(snippet) = raw.snippet.as_deref() {
            parts.push(snippet);
        }
        if let Some(summary) = raw.text_summary.as_deref() {
            parts.push(summary);
        }
        let mut content = clean_text(&parts.join("\n"));
        if content.is_empty() {
            content = NO_CONTENT.to_string();
        }
        let content = truncate_chars(&content, self.max_content_len);

        let source = match normalize_source(raw.source.as_deref().unwrap_or_default()) {
            s if s.is_empty() => "unknown".to_string(),
            s => s,
        };

        let sentiment = match clean_text(raw.sentiment.as_deref().unwrap_or_default()) {
            s if s.is_empty() => "neutral".to_string(),
            s => s,
        };

        Ok(Mention {
            mention_id,
            timestamp,
            source,
            content,
            url: clean_text(raw.url.as_deref().unwrap_or_default()),
            author: clean_text(raw.author.as_deref().unwrap_or_default()),
            title: clean_text(raw.title.as_deref().unwrap_or_default()),
            keywords: clean_text(raw.keywords.as_deref().unwrap_or_default()),
            sentiment,
            ttl: (now + self.retention).timestamp(),
        })
    }
}
