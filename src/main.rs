use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use macro_dashboard::config::DashboardConfig;
use macro_dashboard::handlers::AppState;
use macro_dashboard::routes;
use macro_dashboard::services::catalog::default_panels;
use macro_dashboard::services::dashboard::{build_fetcher, Session};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = DashboardConfig::from_env()?;
    info!(
        "Dashboard window starts {}, CPI series {}",
        config.start_date, config.cpi_series
    );

    let state = Arc::new(AppState {
        fetcher: Arc::new(build_fetcher(&config)?),
        session: Session::from_config(&config),
        panels: default_panels(),
    });

    // Bind to 0.0.0.0 so the service is reachable inside containers
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api)
        .run(addr)
        .await;

    Ok(())
}
