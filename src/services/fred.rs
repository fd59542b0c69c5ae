// src/services/fred.rs
use chrono::NaiveDate;
use csv::Reader;
use log::{info, error};
use reqwest::Client;
use serde::Deserialize;

use crate::models::TimeSeries;
use super::error::FetchError;

const PROVIDER: &str = "FRED";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

/// FRED client. Uses the JSON observations API when an API key is
/// configured and the keyless `fredgraph.csv` download otherwise.
#[derive(Clone)]
pub struct FredClient {
    client: Client,
    api_base: String,
    graph_url: String,
    api_key: Option<String>,
}

impl FredClient {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        graph_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        FredClient {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            graph_url: graph_url.into(),
            api_key,
        }
    }

    pub async fn fetch_series(
        &self,
        code: &str,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, FetchError> {
        match &self.api_key {
            Some(key) => self.fetch_json(code, key, start).await,
            None => self.fetch_csv(code, start).await,
        }
    }

    async fn fetch_json(
        &self,
        code: &str,
        api_key: &str,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, FetchError> {
        let url = format!("{}/fred/series/observations", self.api_base);
        info!("Fetching FRED series {} from {}", code, url);

        let mut query = vec![
            ("series_id", code.to_string()),
            ("api_key", api_key.to_string()),
            ("file_type", "json".to_string()),
        ];
        if let Some(start) = start {
            query.push(("observation_start", start.format("%Y-%m-%d").to_string()));
        }

        let response = self.client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Http { provider: PROVIDER, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Http { provider: PROVIDER, source })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error_message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            error!("FRED returned {} for {}: {}", status, code, message);
            if message.contains("does not exist") {
                return Err(FetchError::UnknownSeries(code.to_string()));
            }
            return Err(FetchError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ObservationsResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::parse(PROVIDER, e.to_string()))?;

        let mut rows = Vec::with_capacity(parsed.observations.len());
        for obs in parsed.observations {
            rows.push((parse_date(&obs.date)?, parse_value(&obs.value)?));
        }
        Ok(TimeSeries::from_raw(rows))
    }

    async fn fetch_csv(
        &self,
        code: &str,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, FetchError> {
        info!("Fetching FRED series {} as CSV from {}", code, self.graph_url);

        let mut query = vec![("id", code.to_string())];
        if let Some(start) = start {
            query.push(("cosd", start.format("%Y-%m-%d").to_string()));
        }

        let response = self.client
            .get(&self.graph_url)
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Http { provider: PROVIDER, source })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::UnknownSeries(code.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let csv_text = response
            .text()
            .await
            .map_err(|source| FetchError::Http { provider: PROVIDER, source })?;

        let series = parse_fredgraph_csv(&csv_text)?;
        // cosd is advisory on the graph endpoint, so clip locally too
        Ok(match start {
            Some(start) => series.since(start),
            None => series,
        })
    }
}

/// Parses a two-column `fredgraph.csv` body (date, value).
pub fn parse_fredgraph_csv(csv_text: &str) -> Result<TimeSeries, FetchError> {
    let mut rdr = Reader::from_reader(csv_text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| FetchError::parse(PROVIDER, e.to_string()))?
        .clone();
    if headers.len() < 2 {
        return Err(FetchError::parse(PROVIDER, "expected a date and a value column"));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let row = record.map_err(|e| FetchError::parse(PROVIDER, e.to_string()))?;
        let date = row.get(0).ok_or_else(|| FetchError::parse(PROVIDER, "missing date field"))?;
        let value = row.get(1).unwrap_or("");
        rows.push((parse_date(date)?, parse_value(value)?));
    }
    Ok(TimeSeries::from_raw(rows))
}

fn parse_date(raw: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| FetchError::parse(PROVIDER, format!("bad date '{}': {}", raw, e)))
}

/// FRED marks missing observations with "." (and fredgraph sometimes with "").
fn parse_value(raw: &str) -> Result<Option<f64>, FetchError> {
    let cell = raw.trim();
    if cell.is_empty() || cell == "." {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| FetchError::parse(PROVIDER, format!("bad value '{}': {}", cell, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_fredgraph_csv_with_missing_values() {
        let csv = "observation_date,DGS10\n2024-01-01,.\n2024-01-02,3.95\n2024-01-03,\n2024-01-04,3.99\n";
        let series = parse_fredgraph_csv(csv).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.get(d(2024, 1, 2)), Some(3.95));
        assert_eq!(series.get(d(2024, 1, 4)), Some(3.99));
    }

    #[test]
    fn rejects_single_column_csv() {
        let err = parse_fredgraph_csv("DATE\n2024-01-01\n").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn fetches_json_observations_with_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fred/series/observations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("series_id".into(), "CPIAUCSL".into()),
                Matcher::UrlEncoded("api_key".into(), "secret".into()),
                Matcher::UrlEncoded("observation_start".into(), "2023-01-01".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"observations":[
                    {"realtime_start":"2024-05-01","date":"2023-01-01","value":"300.5"},
                    {"realtime_start":"2024-05-01","date":"2023-02-01","value":"."},
                    {"realtime_start":"2024-05-01","date":"2023-03-01","value":"301.8"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = FredClient::new(Client::new(), server.url(), "unused", Some("secret".into()));
        let series = client.fetch_series("CPIAUCSL", Some(d(2023, 1, 1))).await.unwrap();

        mock.assert_async().await;
        assert_eq!(series.values(), vec![300.5, 301.8]);
    }

    #[tokio::test]
    async fn maps_missing_series_to_unknown_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fred/series/observations")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#)
            .create_async()
            .await;

        let client = FredClient::new(Client::new(), server.url(), "unused", Some("k".into()));
        let err = client.fetch_series("NOPE", None).await.unwrap_err();

        assert!(matches!(err, FetchError::UnknownSeries(code) if code == "NOPE"));
    }

    #[tokio::test]
    async fn falls_back_to_graph_csv_without_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/graph/fredgraph.csv")
            .match_query(Matcher::UrlEncoded("id".into(), "RRPONTSYD".into()))
            .with_status(200)
            .with_body("observation_date,RRPONTSYD\n2024-06-27,400.1\n2024-06-28,.\n2024-07-01,450.0\n")
            .create_async()
            .await;

        let graph_url = format!("{}/graph/fredgraph.csv", server.url());
        let client = FredClient::new(Client::new(), server.url(), graph_url, None);
        let series = client.fetch_series("RRPONTSYD", Some(d(2024, 6, 28))).await.unwrap();

        // the 06-27 row predates the requested start
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(d(2024, 7, 1)), Some(450.0));
    }
}
