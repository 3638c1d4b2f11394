// Trait abstraction for the fetch side of the pipeline.
//
// MentionFetcher hides the HTTP client so pipeline tests run against a
// scripted MockFetcher: no network, no mock server, deterministic pages.

use async_trait::async_trait;

use mentionmind_client::{MentionMindClient, MentionMindError, RawMention};
use mentionwatch_common::IngestError;

/// One page of raw mentions plus the token to resume from. `next_cursor`
/// of `None` means the listing is exhausted.
#[derive(Debug, Clone, Default)]
pub struct FetchPage {
    pub records: Vec<RawMention>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait MentionFetcher: Send + Sync {
    /// Fetch the page at `cursor` (`None` = from the start). Transport
    /// retry happens below this seam; an error here is terminal for the
    /// invocation.
    async fn pull(&self, cursor: Option<&str>) -> Result<FetchPage, IngestError>;
}

/// Production fetcher over the MentionMind REST client.
pub struct ApiFetcher {
    client: MentionMindClient,
    page_limit: u32,
}

impl ApiFetcher {
    pub fn new(client: MentionMindClient, page_limit: u32) -> Self {
        Self { client, page_limit }
    }
}

#[async_trait]
impl MentionFetcher for ApiFetcher {
    async fn pull(&self, cursor: Option<&str>) -> Result<FetchPage, IngestError> {
        let page = self
            .client
            .fetch_page(cursor, self.page_limit)
            .await
            .map_err(map_client_err)?;
        Ok(FetchPage {
            records: page.mentions,
            next_cursor: page.next_cursor,
        })
    }
}

/// Client errors arrive here with the transport retry budget already spent,
/// so the mapping only preserves classification for reporting.
fn map_client_err(err: MentionMindError) -> IngestError {
    match err {
        MentionMindError::Network(msg) => IngestError::TransientNetwork(msg),
        MentionMindError::RateLimited { retry_after_secs } => {
            IngestError::RateLimited { retry_after_secs }
        }
        MentionMindError::Auth(msg) => IngestError::Auth(msg),
        MentionMindError::Api { status, message } => {
            IngestError::Anyhow(anyhow::anyhow!("mentions API error ({status}): {message}"))
        }
        MentionMindError::Parse(msg) => {
            IngestError::Anyhow(anyhow::anyhow!("malformed mentions API response: {msg}"))
        }
    }
}
