// src/bin/print_dashboard.rs
use anyhow::Result;
use dotenv::dotenv;
use log::info;

use macro_dashboard::config::DashboardConfig;
use macro_dashboard::services::catalog::default_panels;
use macro_dashboard::services::dashboard::{build_fetcher, render_dashboard, Session};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = DashboardConfig::from_env()?;
    let fetcher = build_fetcher(&config)?;
    let session = Session::from_config(&config);

    info!("Rendering dashboard from {}", config.start_date);
    let tabs = render_dashboard(&default_panels(), &fetcher, &session).await;

    for tab in &tabs {
        println!("== {}", tab.id);
        for panel in &tab.panels {
            println!("  {}", panel.title);
            for series in &panel.series {
                match series.points.last() {
                    Some(last) => println!(
                        "    {:<20} {:>6} obs, last {} = {:.4}",
                        series.label,
                        series.points.len(),
                        last.date,
                        last.value
                    ),
                    None => println!("    {:<20} no observations", series.label),
                }
            }
            for advisory in &panel.advisories {
                println!("    ! {}", advisory);
            }
        }
    }

    Ok(())
}
