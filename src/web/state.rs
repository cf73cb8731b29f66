//! Application state shared across handlers

use super::limiter::build_limiter;
use crate::config::Settings;
use crate::llm::CompletionClient;
use crate::metrics::Metrics;
use crate::search::Search;
use crate::storage::Storage;
use governor::DefaultDirectRateLimiter;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search orchestrator
    pub search: Arc<Search>,
    /// Search record store
    pub storage: Arc<Storage>,
    /// Per-site diagnostics
    pub metrics: Arc<Metrics>,
    /// API request limiter, absent when disabled
    pub limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl AppState {
    /// Create new application state; creates the data directories
    pub fn new(settings: Settings, client: Arc<dyn CompletionClient>) -> anyhow::Result<Self> {
        let metrics = Arc::new(Metrics::new());
        let search = Search::from_settings(&settings, client).with_metrics(metrics.clone());
        let storage = Storage::new(&settings.storage.data_dir)?;
        let limiter = build_limiter(settings.server.rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            settings: Arc::new(settings),
            search: Arc::new(search),
            storage: Arc::new(storage),
            metrics,
            limiter,
        })
    }

    /// Get project name
    pub fn project_name(&self) -> &str {
        &self.settings.general.project_name
    }
}
