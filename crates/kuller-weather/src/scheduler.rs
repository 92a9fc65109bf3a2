//! Periodic fetch-and-store loop.
//!
//! One cycle per cadence occurrence: fetch the feed, append the batch. A
//! failed cycle is logged and the next one is scheduled normally; only
//! cancellation stops the loop.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio_util::sync::CancellationToken;

use crate::feed::FeedClient;
use crate::store::ObservationStore;

/// Drives the ingestion cycle on a cron-style cadence.
pub struct IngestScheduler {
    feed: Arc<FeedClient>,
    store: Arc<ObservationStore>,
    schedule: Schedule,
    token: CancellationToken,
}

impl IngestScheduler {
    /// Create a scheduler for the given cadence expression
    /// (seconds-leading cron format, e.g. `0 15 * * * *`).
    pub fn new(
        feed: Arc<FeedClient>,
        store: Arc<ObservationStore>,
        cadence: &str,
        token: CancellationToken,
    ) -> anyhow::Result<Self> {
        let schedule = Schedule::from_str(cadence)
            .with_context(|| format!("Invalid cadence expression: {cadence}"))?;

        tracing::info!("Ingestion scheduler initialized with cadence: {cadence}");

        Ok(Self {
            feed,
            store,
            schedule,
            token,
        })
    }

    /// Run cycles until cancelled.
    ///
    /// Cycles never overlap: the next occurrence is computed only after the
    /// current cycle finishes, so a slow fetch delays but never skips.
    pub async fn run(self) {
        tracing::info!("Ingestion scheduler starting");

        loop {
            if self.token.is_cancelled() {
                break;
            }

            let wait = next_wait(&self.schedule, Utc::now());
            tracing::info!("Next observation fetch in {:?}", wait);

            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            if self.token.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_cycle().await {
                tracing::error!("Ingestion cycle failed: {e:#}");
            }
        }

        tracing::info!("Ingestion scheduler stopped");
    }

    /// One fetch-and-store cycle.
    pub async fn run_cycle(&self) -> anyhow::Result<()> {
        let observations = self.feed.fetch().await?;
        let written = self.store.append(&observations)?;
        tracing::info!("Stored {written} observations");
        Ok(())
    }
}

/// Wait duration until the next cadence occurrence.
///
/// If the schedule yields an occurrence that is not strictly in the future
/// (clock skew around startup), recompute from one minute ahead; if it
/// yields nothing at all, fall back to an hour.
fn next_wait(schedule: &Schedule, now: DateTime<Utc>) -> std::time::Duration {
    let next = schedule
        .after(&now)
        .next()
        .filter(|t| *t > now)
        .or_else(|| {
            schedule
                .after(&(now + chrono::Duration::minutes(1)))
                .next()
        })
        .unwrap_or_else(|| now + chrono::Duration::hours(1));

    (next - now)
        .to_std()
        .unwrap_or_else(|_| std::time::Duration::from_secs(3600))
}
