use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mentionmind_client::MentionMindClient;
use mentionwatch_common::Config;
use mentionwatch_ingest::{ApiFetcher, Pipeline};
use mentionwatch_store::PgMentionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("mentionwatch_ingest=info".parse()?)
                .add_directive("mentionwatch_store=info".parse()?)
                .add_directive("mentionmind_client=info".parse()?),
        )
        .init();

    info!("Mentionwatch ingest starting...");

    // Load config
    let config = Config::from_env();
    config.log_redacted();

    // Connect to Postgres and run migrations
    let store = PgMentionStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let client = MentionMindClient::new(config.mentionmind_api_key.clone())
        .with_base_url(config.mentionmind_base_url.clone());
    let fetcher = ApiFetcher::new(client, config.page_limit);

    let pipeline = Pipeline::new(Arc::new(fetcher), Arc::new(store), &config);
    let report = pipeline.run().await;

    info!("{}", report.stats);

    if let Some(err) = report.error {
        error!(error = %err, "Ingest run failed; cursor saved at last committed page");
        return Err(err.into());
    }
    Ok(())
}
