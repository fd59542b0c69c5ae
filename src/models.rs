// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::NaiveDate;
use std::fmt;

/// One dated value of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A date-ordered series with no duplicate dates and no missing values.
///
/// Built from raw provider rows with [`TimeSeries::from_raw`], which drops
/// absent or non-finite values, sorts by date and keeps the last value seen
/// for a repeated date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<Observation>,
}

impl TimeSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_raw<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let mut points: Vec<Observation> = rows
            .into_iter()
            .filter_map(|(date, value)| match value {
                Some(v) if v.is_finite() => Some(Observation { date, value: v }),
                _ => None,
            })
            .collect();

        // stable sort keeps provider order among equal dates, so the
        // dedup below retains the last value reported for a day
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }

        TimeSeries { points: deduped }
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Observations on or after `start`.
    pub fn since(&self, start: NaiveDate) -> TimeSeries {
        let from = self.points.partition_point(|p| p.date < start);
        TimeSeries { points: self.points[from..].to_vec() }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

impl From<Vec<(NaiveDate, f64)>> for TimeSeries {
    fn from(rows: Vec<(NaiveDate, f64)>) -> Self {
        TimeSeries::from_raw(rows.into_iter().map(|(d, v)| (d, Some(v))))
    }
}

/// Data provider a series code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Fred,
    Yahoo,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Provider::Fred => write!(f, "FRED"),
            Provider::Yahoo => write!(f, "Yahoo"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesSource {
    pub provider: Provider,
    pub code: String,
}

impl SeriesSource {
    pub fn fred(code: impl Into<String>) -> Self {
        SeriesSource { provider: Provider::Fred, code: code.into() }
    }

    pub fn yahoo(code: impl Into<String>) -> Self {
        SeriesSource { provider: Provider::Yahoo, code: code.into() }
    }
}

impl fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.code)
    }
}

/// How a panel's nominal series is combined with inflation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Values are percentages; real = nominal - inflation.
    Rate,
    /// Values are price levels; real price compounds deflated daily returns.
    Price,
    NoAdjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Nominal,
    Real,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSeries {
    pub label: String,
    pub kind: SeriesKind,
    pub points: TimeSeries,
}

/// Non-fatal condition attached to a single panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    FetchFailure { series: String, reason: String },
    InflationUnavailable { reason: String },
    InsufficientHistory { observations: usize },
    DomainMismatch { series: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Advisory::FetchFailure { series, reason } => {
                write!(f, "{} is unavailable: {}", series, reason)
            }
            Advisory::InflationUnavailable { reason } => {
                write!(f, "Inflation data unavailable, showing nominal values only: {}", reason)
            }
            Advisory::InsufficientHistory { observations } => write!(
                f,
                "Only {} CPI observations, at least 13 are needed for year-over-year inflation",
                observations
            ),
            Advisory::DomainMismatch { series } => {
                write!(f, "{} shares no dates with the inflation series", series)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeButton {
    pub label: &'static str,
    pub months: Option<u32>,
}

/// Rendering hints handed to the front end alongside each panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub y_axis: &'static str,
    pub range_selector: Vec<RangeButton>,
}

impl ChartOptions {
    pub fn for_adjustment(adjustment: Adjustment) -> Self {
        let y_axis = match adjustment {
            Adjustment::Rate => "percent",
            Adjustment::Price | Adjustment::NoAdjustment => "level",
        };
        ChartOptions {
            y_axis,
            range_selector: vec![
                RangeButton { label: "1M", months: Some(1) },
                RangeButton { label: "6M", months: Some(6) },
                RangeButton { label: "1Y", months: Some(12) },
                RangeButton { label: "5Y", months: Some(60) },
                RangeButton { label: "All", months: None },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub id: String,
    pub tab: String,
    pub title: String,
    pub series: Vec<LabeledSeries>,
    pub chart: ChartOptions,
    pub advisories: Vec<Advisory>,
}

impl PanelView {
    pub fn series_of(&self, kind: SeriesKind) -> Option<&LabeledSeries> {
        self.series.iter().find(|s| s.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub id: String,
    pub panels: Vec<PanelView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn from_raw_drops_missing_and_sorts() {
        let series = TimeSeries::from_raw(vec![
            (d(2024, 1, 3), Some(3.0)),
            (d(2024, 1, 1), Some(1.0)),
            (d(2024, 1, 2), None),
            (d(2024, 1, 4), Some(f64::NAN)),
        ]);

        let dates: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 3)]);
        assert_eq!(series.values(), vec![1.0, 3.0]);
    }

    #[test]
    fn from_raw_keeps_last_value_for_repeated_date() {
        let series = TimeSeries::from_raw(vec![
            (d(2024, 1, 2), Some(10.0)),
            (d(2024, 1, 2), Some(11.0)),
            (d(2024, 1, 2), Some(12.5)),
        ]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.get(d(2024, 1, 2)), Some(12.5));
    }

    #[test]
    fn serializes_as_plain_array() {
        let series = TimeSeries::from(vec![(d(2024, 3, 1), 4.25)]);
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json, serde_json::json!([{ "date": "2024-03-01", "value": 4.25 }]));
    }

    #[test]
    fn advisory_serializes_with_kind_tag() {
        let advisory = Advisory::DomainMismatch { series: "10Y Treasury".to_string() };
        let json = serde_json::to_value(&advisory).unwrap();
        assert_eq!(json["kind"], "domain_mismatch");
        assert_eq!(json["series"], "10Y Treasury");
    }
}
