// src/bin/fetch_series.rs
use anyhow::{bail, Result};
use chrono::NaiveDate;
use dotenv::dotenv;
use std::env;

use macro_dashboard::config::DashboardConfig;
use macro_dashboard::models::SeriesSource;
use macro_dashboard::services::dashboard::build_fetcher;
use macro_dashboard::services::fetcher::SeriesFetcher;

/// Usage: fetch_series <fred|yahoo> <CODE> [YYYY-MM-DD]
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let source = match (args.first().map(String::as_str), args.get(1)) {
        (Some("fred"), Some(code)) => SeriesSource::fred(code.clone()),
        (Some("yahoo"), Some(code)) => SeriesSource::yahoo(code.clone()),
        _ => bail!("usage: fetch_series <fred|yahoo> <CODE> [YYYY-MM-DD]"),
    };
    let start = args
        .get(2)
        .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .transpose()?;

    let config = DashboardConfig::from_env()?;
    let fetcher = build_fetcher(&config)?;
    let series = fetcher.fetch(&source, start).await?;

    println!("{}: {} observations", source, series.len());
    for obs in series.points().iter().rev().take(10).rev() {
        println!("  {}  {}", obs.date, obs.value);
    }
    Ok(())
}
