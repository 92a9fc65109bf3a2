//! Observation feed client: HTTP fetch and XML parsing.
//!
//! The feed is a single XML document listing every station in the country
//! under a top-level batch timestamp. Only stations covering a monitored
//! city are kept; numeric fields that fail to parse fall back to zero so a
//! degraded reading still beats losing the whole cycle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::observation::{city_for_station, Observation};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that fail a whole fetch cycle.
///
/// Field-level parse problems are recovered locally and never surface here.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed feed document: {0}")]
    Malformed(String),
}

/// Raw feed document as delivered by the weather service.
#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(rename = "@timestamp")]
    timestamp: Option<String>,
    #[serde(rename = "station", default)]
    stations: Vec<FeedStation>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedStation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    wmocode: String,
    #[serde(default)]
    airtemperature: String,
    #[serde(default)]
    windspeed: String,
    #[serde(default)]
    phenomenon: String,
}

/// HTTP client for the observation feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Arc<Client>,
    endpoint: Url,
}

impl FeedClient {
    /// Create a client for the given feed endpoint.
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint).context("Invalid feed endpoint URL")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            endpoint,
        })
    }

    /// Fetch the feed and return one observation per monitored city present
    /// in the batch.
    ///
    /// Transport failures and structurally malformed documents fail the
    /// whole fetch; no partial batch is returned.
    pub async fn fetch(&self) -> Result<Vec<Observation>, FeedError> {
        tracing::debug!("Fetching observations from {}", self.endpoint);

        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let body = response.text().await?;
        let observations = parse_feed(&body, Utc::now())?;

        tracing::info!("Fetched {} observations from feed", observations.len());
        Ok(observations)
    }
}

/// Parse a feed document into observations for the monitored cities.
fn parse_feed(xml: &str, now: DateTime<Utc>) -> Result<Vec<Observation>, FeedError> {
    let document: FeedDocument =
        quick_xml::de::from_str(xml).map_err(|e| FeedError::Malformed(e.to_string()))?;

    let timestamp = parse_batch_timestamp(document.timestamp.as_deref(), now);

    let observations = document
        .stations
        .into_iter()
        .filter_map(|station| {
            let city = city_for_station(&station.name)?;
            Some(Observation {
                station: station.name,
                wmo_code: station.wmocode,
                air_temperature: parse_or_zero(&station.airtemperature),
                wind_speed: parse_or_zero(&station.windspeed),
                phenomenon: station.phenomenon,
                timestamp,
                city: city.name.to_string(),
            })
        })
        .collect();

    Ok(observations)
}

/// Tolerant numeric parse: missing or garbled fields become zero.
fn parse_or_zero(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Resolve the batch timestamp attribute.
///
/// The live feed carries Unix epoch seconds; RFC 3339 is accepted as a
/// fallback. Missing or malformed values, and values in the future, resolve
/// to the fetch time so a stored observation is never newer than its store
/// time.
fn parse_batch_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let parsed = raw.and_then(|s| {
        let s = s.trim();
        s.parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            })
    });

    match parsed {
        Some(ts) if ts <= now => ts,
        _ => now,
    }
}
