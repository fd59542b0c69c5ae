// src/services/fetcher.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;

use crate::models::{Provider, SeriesSource, TimeSeries};
use super::error::FetchError;
use super::fred::FredClient;
use super::yahoo::YahooClient;

/// Retrieves one series by provider code. Implementations never retry.
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    async fn fetch(
        &self,
        source: &SeriesSource,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, FetchError>;
}

/// Routes each request to the FRED or Yahoo client.
pub struct MarketDataClient {
    fred: FredClient,
    yahoo: YahooClient,
}

impl MarketDataClient {
    pub fn new(fred: FredClient, yahoo: YahooClient) -> Self {
        MarketDataClient { fred, yahoo }
    }
}

#[async_trait]
impl SeriesFetcher for MarketDataClient {
    async fn fetch(
        &self,
        source: &SeriesSource,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, FetchError> {
        let series = match source.provider {
            Provider::Fred => self.fred.fetch_series(&source.code, start).await?,
            Provider::Yahoo => self.yahoo.fetch_closes(&source.code, start).await?,
        };

        if series.is_empty() {
            return Err(FetchError::Empty(source.code.clone()));
        }
        debug!("Fetched {} observations for {}", series.len(), source);
        Ok(series)
    }
}

/// Serves pre-loaded series, keyed by code. Unknown codes fail like an
/// unknown provider code would. Useful offline and in tests.
#[derive(Default)]
pub struct MemoryFetcher {
    series: HashMap<String, TimeSeries>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, code: impl Into<String>, series: TimeSeries) -> Self {
        self.series.insert(code.into(), series);
        self
    }
}

#[async_trait]
impl SeriesFetcher for MemoryFetcher {
    async fn fetch(
        &self,
        source: &SeriesSource,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, FetchError> {
        let series = self
            .series
            .get(&source.code)
            .ok_or_else(|| FetchError::UnknownSeries(source.code.clone()))?;

        let clipped = match start {
            Some(start) => series.since(start),
            None => series.clone(),
        };
        if clipped.is_empty() {
            return Err(FetchError::Empty(source.code.clone()));
        }
        Ok(clipped)
    }
}
