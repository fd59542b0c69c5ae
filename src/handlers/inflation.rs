// src/handlers/inflation.rs
use warp::reply::Json;
use warp::Rejection;
use log::{info, error, debug};
use std::sync::Arc;
use serde::Serialize;

use crate::models::{SeriesSource, TimeSeries};
use super::AppState;
use super::error::ApiError;

#[derive(Serialize)]
struct InflationResponse<'a> {
    source: &'a SeriesSource,
    index_observations: usize,
    yoy: &'a TimeSeries,
}

pub async fn get_inflation(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get inflation data");

    let cell = state.session.inflation();
    let cpi = cell.get_or_load(state.fetcher.as_ref()).await.map_err(|e| {
        error!("Failed to load CPI series {}: {}", cell.source(), e);
        warp::reject::custom(ApiError::upstream(format!("Failed to fetch inflation data: {}", e)))
    })?;

    debug!("Returning {} inflation observations", cpi.yoy.len());
    Ok(warp::reply::json(&InflationResponse {
        source: cell.source(),
        index_observations: cpi.index_observations,
        yoy: &cpi.yoy,
    }))
}
