// src/services/yahoo.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{info, error, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::models::TimeSeries;
use super::error::FetchError;

const PROVIDER: &str = "Yahoo";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance chart API client returning closing prices per exchange-local date.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    interval: String,
}

impl YahooClient {
    pub fn new(client: Client, base_url: impl Into<String>, interval: impl Into<String>) -> Self {
        YahooClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interval: interval.into(),
        }
    }

    pub async fn fetch_closes(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, FetchError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            symbol.replace('^', "%5E")
        );
        info!("Fetching Yahoo chart for {} from {}", symbol, url);

        let query = chart_query(&self.interval, start, Utc::now());

        let response = self.client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Http { provider: PROVIDER, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Http { provider: PROVIDER, source })?;

        let parsed = match serde_json::from_str::<ChartResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(FetchError::parse(PROVIDER, e.to_string()));
            }
            Err(_) => {
                return Err(FetchError::Status {
                    provider: PROVIDER,
                    status: status.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }
        };

        if let Some(err) = parsed.chart.error {
            let message = err.description.unwrap_or_else(|| err.code.clone());
            error!("Yahoo returned an error for {}: {}", symbol, message);
            if err.code == "Not Found" {
                return Err(FetchError::UnknownSeries(symbol.to_string()));
            }
            return Err(FetchError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let result = parsed
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| FetchError::Empty(symbol.to_string()))?;

        closes_by_local_date(result)
    }
}

/// Days of history Yahoo serves for an intraday interval. `None` for daily and
/// longer bars, which go back to the first trade.
fn intraday_lookback_days(interval: &str) -> Option<i64> {
    match interval {
        "1m" => Some(7),
        "2m" | "5m" | "15m" | "30m" | "90m" => Some(60),
        "60m" | "1h" => Some(730),
        _ => None,
    }
}

/// Query parameters for a chart request. Intraday windows are pulled in to
/// what Yahoo will serve; a request reaching further back is rejected outright.
fn chart_query(
    interval: &str,
    start: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    let requested = start
        .and_then(|s| s.and_hms_opt(0, 0, 0))
        .map(|s| s.and_utc());
    // one day inside the limit so the edge bar is not refused
    let earliest = intraday_lookback_days(interval).map(|days| now - Duration::days(days - 1));

    let period1 = match (requested, earliest) {
        (Some(requested), Some(earliest)) if requested < earliest => {
            warn!(
                "Interval {} only reaches back to {}, not {}",
                interval,
                earliest.date_naive(),
                requested.date_naive()
            );
            Some(earliest)
        }
        (Some(requested), _) => Some(requested),
        (None, earliest) => earliest,
    };

    let mut query = vec![("interval", interval.to_string())];
    match period1 {
        Some(period1) => {
            query.push(("period1", period1.timestamp().to_string()));
            query.push(("period2", now.timestamp().to_string()));
        }
        None => query.push(("range", "max".to_string())),
    }
    query
}

fn closes_by_local_date(result: ChartResult) -> Result<TimeSeries, FetchError> {
    let tz: Tz = result
        .meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse().ok())
        .unwrap_or(chrono_tz::America::New_York);

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        warn!(
            "Yahoo returned {} timestamps but {} closes",
            result.timestamp.len(),
            closes.len()
        );
    }

    let mut rows = Vec::with_capacity(closes.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let utc = DateTime::<Utc>::from_timestamp(*ts, 0)
            .ok_or_else(|| FetchError::parse(PROVIDER, format!("bad timestamp {}", ts)))?;
        rows.push((utc.with_timezone(&tz).date_naive(), close));
    }
    Ok(TimeSeries::from_raw(rows))
}
