// src/services/inflation.rs
use chrono::{Months, NaiveDate};
use log::{info, warn};
use tokio::sync::OnceCell;

use crate::models::{SeriesSource, TimeSeries};
use super::error::FetchError;
use super::fetcher::SeriesFetcher;

/// Number of months between the two ends of a YoY change.
pub const YOY_LAG: usize = 12;

/// Year-over-year percent change of a price index.
///
/// The value at date `d` is `(index[d] / index[d - 12 months] - 1) * 100`.
/// A date whose base month is missing from the index is dropped, as is any
/// result that is not finite. Fewer than 13 observations give an empty series.
pub fn yoy_inflation(index: &TimeSeries) -> TimeSeries {
    let points = index.points();
    if points.len() <= YOY_LAG {
        return TimeSeries::empty();
    }

    let lag = Months::new(YOY_LAG as u32);
    TimeSeries::from_raw(points.iter().map(|p| {
        let yoy = p
            .date
            .checked_sub_months(lag)
            .and_then(|base_date| index.get(base_date))
            .map(|base| (p.value / base - 1.0) * 100.0);
        (p.date, yoy)
    }))
}

/// A loaded CPI index together with its derived YoY series.
#[derive(Debug, Clone, PartialEq)]
pub struct CpiInflation {
    pub index_observations: usize,
    pub yoy: TimeSeries,
}

impl CpiInflation {
    pub fn from_index(index: &TimeSeries) -> Self {
        let yoy = yoy_inflation(index);
        if yoy.is_empty() {
            warn!(
                "CPI index has {} observations, not enough for year-over-year inflation",
                index.len()
            );
        }
        CpiInflation { index_observations: index.len(), yoy }
    }
}

/// Session-scoped memo of the CPI inflation series.
///
/// The first successful load is kept and handed out read-only afterwards.
/// Concurrent callers wait on the same initialization, so CPI is fetched at
/// most once per successful load. Failures are not stored.
pub struct InflationCell {
    source: SeriesSource,
    start: Option<NaiveDate>,
    cell: OnceCell<CpiInflation>,
}

impl InflationCell {
    /// `window_start` is the first date the dashboard shows; the index is
    /// fetched from a year and a month earlier so YoY is defined from there.
    pub fn new(source: SeriesSource, window_start: Option<NaiveDate>) -> Self {
        let start = window_start
            .map(|s| s.checked_sub_months(Months::new(YOY_LAG as u32 + 1)).unwrap_or(s));
        InflationCell { source, start, cell: OnceCell::new() }
    }

    pub fn source(&self) -> &SeriesSource {
        &self.source
    }

    pub fn get(&self) -> Option<&CpiInflation> {
        self.cell.get()
    }

    pub async fn get_or_load(
        &self,
        fetcher: &dyn SeriesFetcher,
    ) -> Result<&CpiInflation, FetchError> {
        self.cell
            .get_or_try_init(|| async {
                info!("Loading CPI index {} for inflation adjustment", self.source);
                let index = fetcher.fetch(&self.source, self.start).await?;
                Ok::<_, FetchError>(CpiInflation::from_index(&index))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn monthly(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TimeSeries::from(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (start + Months::new(i as u32), *v))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn twelve_month_change_in_percent() {
        let mut values = vec![100.0; 12];
        values.push(102.0);
        let yoy = yoy_inflation(&monthly(&values));

        assert_eq!(yoy.len(), 1);
        let only = yoy.first().unwrap();
        assert_eq!(only.date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert!((only.value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn length_is_input_minus_twelve() {
        let values: Vec<f64> = (0..40).map(|i| 250.0 + i as f64 * 0.7).collect();
        let index = monthly(&values);
        let yoy = yoy_inflation(&index);

        assert_eq!(yoy.len(), values.len() - YOY_LAG);
        for (i, p) in yoy.points().iter().enumerate() {
            let expected = (values[i + YOY_LAG] / values[i] - 1.0) * 100.0;
            assert_eq!(p.value, expected);
        }
    }

    #[test]
    fn short_history_is_empty_not_an_error() {
        assert!(yoy_inflation(&monthly(&[100.0; 12])).is_empty());
        assert!(yoy_inflation(&TimeSeries::empty()).is_empty());
    }

    #[test]
    fn zero_base_drops_the_point() {
        let mut values = vec![0.0];
        values.extend(std::iter::repeat(100.0).take(12));
        let yoy = yoy_inflation(&monthly(&values));
        assert!(yoy.is_empty());
    }

    #[test]
    fn missing_month_drops_only_dates_that_need_it() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let gap = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let index = TimeSeries::from_raw((0..26u32).map(|i| {
            let date = start + Months::new(i);
            let value = 100.0 * 1.01f64.powi(i as i32);
            (date, (date != gap).then_some(value))
        }));
        assert_eq!(index.len(), 25);

        let yoy = yoy_inflation(&index);
        let month = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();

        // 2025-01 through 2026-02 have a base; the gap itself and the month
        // that uses it as a base are missing
        assert_eq!(yoy.len(), 12);
        assert_eq!(yoy.get(gap), None);
        assert_eq!(yoy.get(month(2026, 2)), None);

        let annual = (1.01f64.powi(12) - 1.0) * 100.0;
        for date in [month(2025, 1), month(2025, 3), month(2025, 9), month(2026, 1)] {
            let value = yoy.get(date).unwrap();
            assert!((value - annual).abs() < 1e-9, "{date}: {value}");
        }
    }

    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SeriesFetcher for CountingFetcher {
        async fn fetch(
            &self,
            source: &SeriesSource,
            _start: Option<NaiveDate>,
        ) -> Result<TimeSeries, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::UnknownSeries(source.code.clone()));
            }
            let values: Vec<f64> = (0..24).map(|i| 100.0 + i as f64).collect();
            Ok(monthly(&values))
        }
    }

    #[tokio::test]
    async fn loads_cpi_once_per_session() {
        let fetcher = Arc::new(CountingFetcher { calls: AtomicUsize::new(0), fail: false });
        let cell = Arc::new(InflationCell::new(SeriesSource::fred("CPIAUCSL"), None));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let fetcher = fetcher.clone();
            let cell = cell.clone();
            handles.push(tokio::spawn(async move {
                cell.get_or_load(fetcher.as_ref()).await.map(|c| c.yoy.len())
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), 12);
        }

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.get().unwrap().index_observations, 24);
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        let fetcher = CountingFetcher { calls: AtomicUsize::new(0), fail: true };
        let cell = InflationCell::new(SeriesSource::fred("CPIAUCSL"), None);

        assert!(cell.get_or_load(&fetcher).await.is_err());
        assert!(cell.get_or_load(&fetcher).await.is_err());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert!(cell.get().is_none());
    }

    #[test]
    fn cpi_window_starts_thirteen_months_early() {
        let cell = InflationCell::new(
            SeriesSource::fred("CPIAUCSL"),
            NaiveDate::from_ymd_opt(2015, 1, 1),
        );
        assert_eq!(cell.start, NaiveDate::from_ymd_opt(2013, 12, 1));
    }
}
