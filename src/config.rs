// src/config.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org";
pub const DEFAULT_FRED_GRAPH_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_CPI_SERIES: &str = "CPIAUCSL";

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub port: u16,
    pub fred_api_key: Option<String>,
    pub fred_base_url: String,
    pub fred_graph_url: String,
    pub yahoo_base_url: String,
    pub yahoo_interval: String,
    pub cpi_series: String,
    pub start_date: NaiveDate,
    pub http_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            port: DEFAULT_PORT,
            fred_api_key: None,
            fred_base_url: DEFAULT_FRED_BASE_URL.to_string(),
            fred_graph_url: DEFAULT_FRED_GRAPH_URL.to_string(),
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            yahoo_interval: "1d".to_string(),
            cpi_series: DEFAULT_CPI_SERIES.to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            http_timeout: Duration::from_secs(20),
        }
    }
}

impl DashboardConfig {
    /// Reads settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DashboardConfig::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().context("PORT must be a number")?,
            None => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let fred_api_key = get("FRED_API_KEY");
        if fred_api_key.is_none() {
            info!("FRED_API_KEY not set, FRED series will be read from fredgraph.csv");
        }

        let start_date = match get("DASHBOARD_START") {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("DASHBOARD_START '{}' is not a YYYY-MM-DD date", raw))?,
            None => defaults.start_date,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>().context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.http_timeout,
        };

        Ok(DashboardConfig {
            port,
            fred_api_key,
            fred_base_url: get("FRED_BASE_URL").unwrap_or(defaults.fred_base_url),
            fred_graph_url: get("FRED_GRAPH_URL").unwrap_or(defaults.fred_graph_url),
            yahoo_base_url: get("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            yahoo_interval: get("YAHOO_INTERVAL").unwrap_or(defaults.yahoo_interval),
            cpi_series: get("CPI_SERIES").unwrap_or(defaults.cpi_series),
            start_date,
            http_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DashboardConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.cpi_series, "CPIAUCSL");
        assert!(config.fred_api_key.is_none());
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("FRED_API_KEY", "abc"),
            ("DASHBOARD_START", "2020-06-01"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("YAHOO_INTERVAL", "1h"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.fred_api_key.as_deref(), Some("abc"));
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.yahoo_interval, "1h");
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let config = config_from(&[("FRED_API_KEY", "  ")]).unwrap();
        assert!(config.fred_api_key.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("DASHBOARD_START", "01/01/2020")]).is_err());
    }
}
