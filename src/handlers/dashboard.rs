// src/handlers/dashboard.rs
use warp::reply::Json;
use warp::Rejection;
use log::info;
use std::sync::Arc;

use crate::services::dashboard::{render_dashboard, render_panel};
use super::AppState;
use super::error::ApiError;

pub async fn get_dashboard(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to render the dashboard");

    let tabs = render_dashboard(&state.panels, state.fetcher.as_ref(), &state.session).await;
    Ok(warp::reply::json(&tabs))
}

pub async fn get_panel(id: String, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to render panel {}", id);

    let spec = state
        .panels
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| warp::reject::custom(ApiError::not_found(format!("Unknown panel '{}'", id))))?;

    let view = render_panel(spec, state.fetcher.as_ref(), &state.session).await;
    Ok(warp::reply::json(&view))
}

pub async fn list_panels(state: Arc<AppState>) -> Result<Json, Rejection> {
    Ok(warp::reply::json(&state.panels))
}
