use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use kuller_pricing::QuoteService;
use kuller_weather::{FeedClient, IngestScheduler, ObservationStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core (tracing, config)
    kuller_core::init()?;

    let (config, _validation) = kuller_core::Config::load_validated()?;

    let store = Arc::new(ObservationStore::open(&config.storage.database_path)?);

    // One-shot mode: `kuller quote <city> <vehicle>` prints a fee and exits.
    let args: Vec<String> = std::env::args().collect();
    if args.len() == 4 && args[1] == "quote" {
        let service = QuoteService::new(store);
        match service.quote_fee(&args[2], &args[3]) {
            Ok(fee) => println!("{fee:.2}"),
            Err(e) => {
                eprintln!("{}", e.user_message());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    tracing::info!("Kuller ingestion daemon starting");

    let feed = Arc::new(FeedClient::new(&config.ingest.feed_url)?);
    let token = CancellationToken::new();
    let scheduler = IngestScheduler::new(
        feed,
        store.clone(),
        &config.ingest.cadence,
        token.clone(),
    )?;

    let handle = tokio::spawn(scheduler.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    token.cancel();
    handle.await?;

    Ok(())
}
