// src/services/catalog.rs
use serde::Serialize;

use crate::models::{Adjustment, SeriesSource};

/// Everything needed to render one chart: where the series comes from,
/// how it is adjusted and what the traces are called.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSpec {
    pub id: &'static str,
    pub tab: &'static str,
    pub title: &'static str,
    pub source: SeriesSource,
    pub adjustment: Adjustment,
    pub nominal_label: &'static str,
    pub real_label: &'static str,
}

impl PanelSpec {
    fn new(
        id: &'static str,
        tab: &'static str,
        title: &'static str,
        source: SeriesSource,
        adjustment: Adjustment,
        nominal_label: &'static str,
        real_label: &'static str,
    ) -> Self {
        PanelSpec { id, tab, title, source, adjustment, nominal_label, real_label }
    }
}

/// The dashboard's panels, in display order.
pub fn default_panels() -> Vec<PanelSpec> {
    vec![
        PanelSpec::new(
            "treasury_2y", "yields", "2-Year Treasury Yield",
            SeriesSource::fred("DGS2"), Adjustment::Rate,
            "2Y Nominal Yield", "2Y Real Yield",
        ),
        PanelSpec::new(
            "treasury_10y", "yields", "10-Year Treasury Yield",
            SeriesSource::fred("DGS10"), Adjustment::Rate,
            "10Y Nominal Yield", "10Y Real Yield",
        ),
        PanelSpec::new(
            "treasury_30y", "yields", "30-Year Treasury Yield",
            SeriesSource::fred("DGS30"), Adjustment::Rate,
            "30Y Nominal Yield", "30Y Real Yield",
        ),
        PanelSpec::new(
            "spy", "equities", "SPY (S&P 500 ETF)",
            SeriesSource::yahoo("SPY"), Adjustment::Price,
            "SPY Nominal", "SPY Real",
        ),
        PanelSpec::new(
            "iwm", "equities", "IWM (Russell 2000 ETF)",
            SeriesSource::yahoo("IWM"), Adjustment::Price,
            "IWM Nominal", "IWM Real",
        ),
        PanelSpec::new(
            "dollar", "dollar", "Dollar Index (via UUP ETF)",
            SeriesSource::yahoo("UUP"), Adjustment::NoAdjustment,
            "UUP", "",
        ),
        PanelSpec::new(
            "reverse_repo", "fed_facilities", "Overnight Reverse Repo Facility",
            SeriesSource::fred("RRPONTSYD"), Adjustment::NoAdjustment,
            "ON RRP ($bn)", "",
        ),
        // single confirmed code for Standing Repo Facility take-up
        PanelSpec::new(
            "standing_repo", "fed_facilities", "Standing Repo Facility",
            SeriesSource::fred("RPONTSYD"), Adjustment::NoAdjustment,
            "SRF ($bn)", "",
        ),
        PanelSpec::new(
            "vix", "volatility", "VIX",
            SeriesSource::yahoo("^VIX"), Adjustment::NoAdjustment,
            "VIX", "",
        ),
    ]
}

pub fn find_panel(id: &str) -> Option<PanelSpec> {
    default_panels().into_iter().find(|p| p.id == id)
}
