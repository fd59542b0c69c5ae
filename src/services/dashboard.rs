// src/services/dashboard.rs
use anyhow::Result;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;

use crate::config::DashboardConfig;
use crate::models::{
    Adjustment, Advisory, ChartOptions, LabeledSeries, PanelView, SeriesKind, SeriesSource,
    TabView, TimeSeries,
};
use super::catalog::PanelSpec;
use super::fetcher::{MarketDataClient, SeriesFetcher};
use super::fred::FredClient;
use super::inflation::InflationCell;
use super::real_value::{real_price, real_rate};
use super::yahoo::YahooClient;

/// State that lives for one dashboard session: the window start and the
/// memoized CPI inflation series.
pub struct Session {
    start: Option<NaiveDate>,
    inflation: InflationCell,
}

impl Session {
    pub fn new(cpi: SeriesSource, start: Option<NaiveDate>) -> Self {
        Session { start, inflation: InflationCell::new(cpi, start) }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Session::new(SeriesSource::fred(config.cpi_series.clone()), Some(config.start_date))
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn inflation(&self) -> &InflationCell {
        &self.inflation
    }
}

pub fn build_fetcher(config: &DashboardConfig) -> Result<MarketDataClient> {
    let client = Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let fred = FredClient::new(
        client.clone(),
        config.fred_base_url.clone(),
        config.fred_graph_url.clone(),
        config.fred_api_key.clone(),
    );
    let yahoo = YahooClient::new(client, config.yahoo_base_url.clone(), config.yahoo_interval.clone());
    Ok(MarketDataClient::new(fred, yahoo))
}

/// Fetch, adjust and label one panel. Never fails: every problem becomes an
/// advisory on the returned view.
pub async fn render_panel(
    spec: &PanelSpec,
    fetcher: &dyn SeriesFetcher,
    session: &Session,
) -> PanelView {
    let mut view = PanelView {
        id: spec.id.to_string(),
        tab: spec.tab.to_string(),
        title: spec.title.to_string(),
        series: Vec::new(),
        chart: ChartOptions::for_adjustment(spec.adjustment),
        advisories: Vec::new(),
    };

    let nominal = match fetcher.fetch(&spec.source, session.start()).await {
        Ok(series) => series,
        Err(e) => {
            warn!("Panel {} degraded, {} unavailable: {}", spec.id, spec.source, e);
            view.advisories.push(Advisory::FetchFailure {
                series: spec.nominal_label.to_string(),
                reason: e.to_string(),
            });
            return view;
        }
    };

    let real = adjust(spec, &nominal, fetcher, session, &mut view.advisories).await;

    view.series.push(LabeledSeries {
        label: spec.nominal_label.to_string(),
        kind: SeriesKind::Nominal,
        points: nominal,
    });
    if let Some(real) = real {
        view.series.push(LabeledSeries {
            label: spec.real_label.to_string(),
            kind: SeriesKind::Real,
            points: real,
        });
    }

    view
}

async fn adjust(
    spec: &PanelSpec,
    nominal: &TimeSeries,
    fetcher: &dyn SeriesFetcher,
    session: &Session,
    advisories: &mut Vec<Advisory>,
) -> Option<TimeSeries> {
    if spec.adjustment == Adjustment::NoAdjustment {
        return None;
    }

    let cpi = match session.inflation().get_or_load(fetcher).await {
        Ok(cpi) => cpi,
        Err(e) => {
            warn!("Panel {} shown without inflation adjustment: {}", spec.id, e);
            advisories.push(Advisory::InflationUnavailable { reason: e.to_string() });
            return None;
        }
    };

    if cpi.yoy.is_empty() {
        advisories.push(Advisory::InsufficientHistory { observations: cpi.index_observations });
        return None;
    }

    let real = match spec.adjustment {
        Adjustment::Rate => real_rate(nominal, &cpi.yoy),
        Adjustment::Price => real_price(nominal, &cpi.yoy),
        Adjustment::NoAdjustment => return None,
    };

    if real.is_empty() {
        warn!("Panel {}: {} has no dates in common with CPI", spec.id, spec.source);
        advisories.push(Advisory::DomainMismatch { series: spec.nominal_label.to_string() });
        return None;
    }
    Some(real)
}

/// Render every panel in order and group them by tab.
pub async fn render_dashboard(
    panels: &[PanelSpec],
    fetcher: &dyn SeriesFetcher,
    session: &Session,
) -> Vec<TabView> {
    info!("Rendering {} panels", panels.len());

    let mut tabs: Vec<TabView> = Vec::new();
    for spec in panels {
        let view = render_panel(spec, fetcher, session).await;
        match tabs.iter_mut().find(|t| t.id == spec.tab) {
            Some(tab) => tab.panels.push(view),
            None => tabs.push(TabView { id: spec.tab.to_string(), panels: vec![view] }),
        }
    }

    let degraded = tabs
        .iter()
        .flat_map(|t| &t.panels)
        .filter(|p| !p.advisories.is_empty())
        .count();
    if degraded > 0 {
        warn!("{} of {} panels rendered with advisories", degraded, panels.len());
    }
    tabs
}
