//! Search request and response models

use crate::results::SearchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default cap on returned listings
pub const DEFAULT_MAX_RESULTS: i64 = 10;

/// Largest accepted `max_results`
pub const MAX_RESULTS_LIMIT: i64 = 100;

/// Body of `POST /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Description of the construction asset to search for
    pub asset_description: String,
    /// Maximum number of results to return; explicit `null` disables the cap
    #[serde(default = "default_max_results")]
    pub max_results: Option<i64>,
}

fn default_max_results() -> Option<i64> {
    Some(DEFAULT_MAX_RESULTS)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("asset_description must not be empty")]
    EmptyDescription,

    #[error("max_results must be between 1 and 100, got {0}")]
    MaxResultsOutOfRange(i64),
}

impl SearchRequest {
    pub fn new(asset_description: impl Into<String>) -> Self {
        Self {
            asset_description: asset_description.into(),
            max_results: default_max_results(),
        }
    }

    pub fn with_max_results(mut self, max: Option<i64>) -> Self {
        self.max_results = max;
        self
    }

    /// Check field constraints before any orchestration runs
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.asset_description.trim().is_empty() {
            return Err(RequestError::EmptyDescription);
        }
        if let Some(max) = self.max_results {
            if !(1..=MAX_RESULTS_LIMIT).contains(&max) {
                return Err(RequestError::MaxResultsOutOfRange(max));
            }
        }
        Ok(())
    }

    /// Result cap as a length, if any
    pub fn limit(&self) -> Option<usize> {
        self.max_results.and_then(|m| usize::try_from(m).ok())
    }
}

/// Body returned by `POST /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
    /// Seconds spent searching the target websites
    pub execution_time: f64,
    pub timestamp: DateTime<Utc>,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, results: Vec<SearchResult>, execution_time: f64) -> Self {
        Self {
            query: query.into(),
            total_results: results.len(),
            results,
            execution_time,
            timestamp: Utc::now(),
        }
    }
}
