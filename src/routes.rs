// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::dashboard::{get_dashboard, get_panel, list_panels};
use crate::handlers::inflation::get_inflation;
use crate::handlers::AppState;
use log::info;

use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found";
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = &api_error.message;
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed";
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error";
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_dashboard);

    let panels_route = warp::path!("api" / "v1" / "panels")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(list_panels);

    let panel_route = warp::path!("api" / "v1" / "panels" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_panel);

    let inflation_route = warp::path!("api" / "v1" / "inflation")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_inflation);

    info!("All routes configured successfully.");

    dashboard_route
        .or(panels_route)
        .or(panel_route)
        .or(inflation_route)
        .recover(handle_rejection)
}
