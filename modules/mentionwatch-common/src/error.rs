use thiserror::Error;

/// Error taxonomy for one ingestion run.
///
/// Transient variants are retried with backoff up to a fixed attempt
/// ceiling; fatal variants stop the invocation. Validation failures are
/// per-record: the pipeline logs and skips them, never aborting the batch.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store capacity error: {0}")]
    StoreCapacity(String),

    #[error("Store schema error: {0}")]
    StoreSchema(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IngestError {
    /// Whether a bounded-backoff retry is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IngestError::TransientNetwork(_)
                | IngestError::RateLimited { .. }
                | IngestError::StoreCapacity(_)
        )
    }

    /// Retry-after hint in seconds, when the failure carried one.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            IngestError::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(IngestError::TransientNetwork("reset".into()).is_transient());
        assert!(IngestError::RateLimited {
            retry_after_secs: Some(2)
        }
        .is_transient());
        assert!(IngestError::StoreCapacity("throttled".into()).is_transient());
        assert!(!IngestError::Auth("bad key".into()).is_transient());
        assert!(!IngestError::Validation("missing id".into()).is_transient());
        assert!(!IngestError::StoreSchema("missing table".into()).is_transient());
    }

    #[test]
    fn retry_hint_surfaces_only_for_rate_limits() {
        let limited = IngestError::RateLimited {
            retry_after_secs: Some(7),
        };
        assert_eq!(limited.retry_after_secs(), Some(7));
        assert_eq!(
            IngestError::TransientNetwork("x".into()).retry_after_secs(),
            None
        );
    }
}
