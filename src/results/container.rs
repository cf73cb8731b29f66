//! Result container for aggregating per-site extraction output

use super::types::SearchResult;
use serde::Serialize;

/// Outcome of searching one target website
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum SiteStatus {
    /// The model returned at least one listing
    Ok,
    /// The model returned an empty list
    Empty,
    /// Every attempt failed; the message is from the last attempt
    Error(String),
}

/// Diagnostics for one website within one search
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub website: String,
    #[serde(flatten)]
    pub status: SiteStatus,
    pub result_count: usize,
    pub attempts: u32,
    pub elapsed_ms: u64,
}

/// Results gathered from all target websites, in aggregation order
/// (site list order, then model order within a site).
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    results: Vec<SearchResult>,
    sites: Vec<SiteReport>,
}

impl SearchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one site's results after everything gathered so far
    pub fn add_site(&mut self, report: SiteReport, results: Vec<SearchResult>) {
        self.results.extend(results);
        self.sites.push(report);
    }

    /// Keep only the first `max` results
    pub fn truncate(&mut self, max: usize) {
        self.results.truncate(max);
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }

    pub fn sites(&self) -> &[SiteReport] {
        &self.sites
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Sites whose every attempt failed
    pub fn failed_sites(&self) -> Vec<&SiteReport> {
        self.sites
            .iter()
            .filter(|s| matches!(s.status, SiteStatus::Error(_)))
            .collect()
    }
}
