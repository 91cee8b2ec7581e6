//! Kalshi REST client for market discovery and quotes
//!
//! Read-only: lists markets and fetches orderbooks, retrying transient
//! failures (transport errors, 429 and 5xx gateway statuses) with capped
//! exponential backoff. Kalshi orderbooks only carry bids, so the YES ask is
//! implied from the best NO bid.

use super::{Market, MarketBatch, MarketSource, Snapshot, ValidationError};
use crate::config::ApiConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Kalshi public API base URL
pub const KALSHI_API_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Environment variable overriding the base URL
pub const KALSHI_BASE_URL_ENV: &str = "KALSHI_BASE_URL";

/// Statuses worth retrying
const RETRY_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Errors from the Kalshi client
#[derive(Debug, Error)]
pub enum KalshiError {
    /// Could not build the HTTP client
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// Transport failure on the final attempt
    #[error("request to {url} failed after {attempts} attempts: {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    /// Retryable status on every attempt
    #[error("{url} still failing after {attempts} attempts ({status}): {body}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        status: u16,
        body: String,
    },
    /// Non-retryable error status
    #[error("request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    /// Body was not the expected JSON
    #[error("response from {url} was not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Configuration for the Kalshi client
#[derive(Debug, Clone)]
pub struct KalshiConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Total attempts per request
    pub retries: u32,
    /// First backoff delay, doubled on each retry
    pub initial_backoff: Duration,
    /// Backoff ceiling
    pub max_backoff: Duration,
    /// Page size for market listing
    pub page_limit: u32,
}

impl Default for KalshiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var(KALSHI_BASE_URL_ENV)
                .unwrap_or_else(|_| KALSHI_API_URL.to_string()),
            timeout: Duration::from_secs(10),
            retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            page_limit: 10,
        }
    }
}

impl From<&ApiConfig> for KalshiConfig {
    fn from(api: &ApiConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_url: api.base_url.clone().unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(api.timeout_secs),
            retries: api.retries.max(1),
            page_limit: api.page_limit,
            ..defaults
        }
    }
}

/// Client for Kalshi's public market data endpoints
pub struct KalshiClient {
    config: KalshiConfig,
    client: Client,
}

impl KalshiClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, KalshiError> {
        Self::with_config(KalshiConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: KalshiConfig) -> Result<Self, KalshiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("kakashi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(KalshiError::Client)?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &KalshiConfig {
        &self.config
    }

    /// GET a JSON document, retrying transient failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, KalshiError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let attempts = self.config.retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let delay = backoff_delay(
                attempt,
                self.config.initial_backoff,
                self.config.max_backoff,
            );

            let response = match self.client.get(&url).query(query).send().await {
                Ok(response) => response,
                Err(source) => {
                    if attempt >= attempts {
                        return Err(KalshiError::Transport {
                            url,
                            attempts,
                            source,
                        });
                    }
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %source,
                        "Kalshi request failed, retrying"
                    );
                    sleep(delay).await;
                    continue;
                }
            };

            let status = response.status();
            if is_retryable(status) {
                if attempt >= attempts {
                    let body = response.text().await.unwrap_or_default();
                    return Err(KalshiError::RetriesExhausted {
                        url,
                        attempts,
                        status: status.as_u16(),
                        body,
                    });
                }
                tracing::warn!(
                    url = %url,
                    attempt,
                    status = status.as_u16(),
                    "Kalshi transient status, retrying"
                );
                sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(KalshiError::Status {
                    url,
                    status: status.as_u16(),
                    body,
                });
            }

            return response
                .json::<T>()
                .await
                .map_err(|source| KalshiError::Decode { url, source });
        }
    }

    /// Fetch all markets, following the pagination cursor
    pub async fn get_markets_paginated(
        &self,
        limit: u32,
    ) -> Result<Vec<KalshiMarket>, KalshiError> {
        let mut markets = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("limit", limit.to_string())];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.clone()));
            }

            let page: MarketsPage = self.get_json("/markets", &query).await?;
            tracing::debug!(count = page.markets.len(), "Fetched Kalshi markets page");
            markets.extend(page.markets);

            let next = page.cursor.or(page.next_page_token);
            cursor = next.filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        Ok(markets)
    }

    /// Fetch the orderbook for one market ticker
    pub async fn get_market_orderbook(&self, ticker: &str) -> Result<KalshiOrderbook, KalshiError> {
        self.get_json(&format!("/markets/{}/orderbook", ticker), &[])
            .await
    }

    /// List markets and build a snapshot for each from its orderbook
    ///
    /// Markets whose orderbook cannot be fetched, or whose quote fails
    /// validation, are listed without a snapshot.
    pub async fn collect(&self, limit: u32) -> Result<MarketBatch, KalshiError> {
        let raw_markets = self.get_markets_paginated(limit).await?;
        let mut batch = MarketBatch::default();

        for raw in raw_markets {
            let market = raw.to_market();

            match self.get_market_orderbook(&raw.ticker).await {
                Ok(book) => match build_snapshot(&raw, &book, Utc::now()) {
                    Ok(snapshot) => batch.snapshots.push(snapshot),
                    Err(e) => {
                        tracing::warn!(
                            market_id = %raw.ticker,
                            error = %e,
                            "Skipping invalid snapshot"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        market_id = %raw.ticker,
                        error = %e,
                        "Skipping snapshot, orderbook unavailable"
                    );
                }
            }

            batch.markets.push(market);
        }

        tracing::info!(
            markets = batch.markets.len(),
            snapshots = batch.snapshots.len(),
            "Collected Kalshi markets"
        );

        Ok(batch)
    }
}

#[async_trait]
impl MarketSource for KalshiClient {
    async fn fetch(&self) -> anyhow::Result<MarketBatch> {
        Ok(self.collect(self.config.page_limit).await?)
    }

    fn name(&self) -> &'static str {
        "kalshi"
    }
}

/// Whether a status should be retried
pub(crate) fn is_retryable(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status)
}

/// Delay before the retry following `attempt` (1-based)
pub(crate) fn backoff_delay(attempt: u32, initial: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    initial.saturating_mul(factor).min(max)
}

/// One page of `/markets`
#[derive(Debug, Deserialize)]
struct MarketsPage {
    #[serde(default)]
    markets: Vec<KalshiMarket>,
    cursor: Option<String>,
    /// Older API revisions
    next_page_token: Option<String>,
}

/// Raw market entry from Kalshi
#[derive(Debug, Clone, Deserialize)]
pub struct KalshiMarket {
    #[serde(alias = "id")]
    pub ticker: String,
    #[serde(default, alias = "question")]
    pub title: String,
    pub close_time: Option<String>,
    pub resolution_source: Option<String>,
    /// Last trade in whole cents
    pub last_price: Option<Decimal>,
    /// Last trade in dollars, preferred when present
    pub last_price_dollars: Option<Decimal>,
    pub volume: Option<i64>,
}

impl KalshiMarket {
    /// Convert to our market listing
    pub fn to_market(&self) -> Market {
        let close_time = self
            .close_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Market {
            id: self.ticker.clone(),
            question: self.title.clone(),
            close_time,
            resolution_source: self
                .resolution_source
                .clone()
                .unwrap_or_else(|| "kalshi".to_string()),
        }
    }
}

/// Orderbook response: `{"orderbook": {"yes": [[price, qty], ...], "no": [...]}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KalshiOrderbook {
    #[serde(default)]
    pub orderbook: OrderbookLevels,
}

/// Bid levels for both sides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderbookLevels {
    #[serde(default)]
    pub yes: Option<Vec<(Decimal, Decimal)>>,
    #[serde(default)]
    pub no: Option<Vec<(Decimal, Decimal)>>,
}

/// Orderbook levels and `last_price` are whole cents
fn cents_to_probability(cents: Decimal) -> Decimal {
    cents / Decimal::ONE_HUNDRED
}

fn best_level(levels: &Option<Vec<(Decimal, Decimal)>>) -> Option<Decimal> {
    levels
        .as_ref()?
        .iter()
        .map(|(price, _)| cents_to_probability(*price))
        .max()
}

/// Build a snapshot from a market entry and its orderbook
pub(crate) fn build_snapshot(
    market: &KalshiMarket,
    book: &KalshiOrderbook,
    ts: DateTime<Utc>,
) -> Result<Snapshot, ValidationError> {
    let bid = best_level(&book.orderbook.yes);
    let ask = best_level(&book.orderbook.no).map(|no_bid| Decimal::ONE - no_bid);
    let last = market
        .last_price_dollars
        .or_else(|| market.last_price.map(cents_to_probability))
        .filter(|p| *p > Decimal::ZERO)
        .or(bid)
        .or(ask);

    Snapshot::new(
        market.ticker.clone(),
        ts,
        bid,
        ask,
        last,
        market.volume.unwrap_or(0),
    )
}
