// src/handlers/mod.rs
use std::sync::Arc;

use crate::services::catalog::PanelSpec;
use crate::services::dashboard::Session;
use crate::services::fetcher::SeriesFetcher;

pub mod dashboard;
pub mod error;
pub mod inflation;

/// Shared by every request for the lifetime of the server.
pub struct AppState {
    pub fetcher: Arc<dyn SeriesFetcher>,
    pub session: Session,
    pub panels: Vec<PanelSpec>,
}
