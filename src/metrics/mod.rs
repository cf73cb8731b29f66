//! Metrics collection module
//!
//! Tracks per-website outcomes so an uncooperative site can be told apart
//! from one that simply had no matching listings.

use crate::results::{SiteReport, SiteStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Number of response times kept per website
const RESPONSE_TIME_WINDOW: usize = 100;

/// In-process metrics collector
pub struct Metrics {
    /// Total search count
    pub total_searches: AtomicU64,
    sites: RwLock<HashMap<String, SiteCounters>>,
}

#[derive(Default)]
struct SiteCounters {
    ok: u64,
    empty: u64,
    errors: u64,
    listings: u64,
    last_error: Option<String>,
    response_times: Vec<u64>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            sites: RwLock::new(HashMap::new()),
        }
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how one website search went
    pub fn record_site(&self, report: &SiteReport) {
        let mut sites = self.sites.write().unwrap_or_else(PoisonError::into_inner);
        let counters = sites.entry(report.website.clone()).or_default();

        match &report.status {
            SiteStatus::Ok => counters.ok += 1,
            SiteStatus::Empty => counters.empty += 1,
            SiteStatus::Error(message) => {
                counters.errors += 1;
                counters.last_error = Some(message.clone());
            }
        }
        counters.listings += report.result_count as u64;

        if counters.response_times.len() >= RESPONSE_TIME_WINDOW {
            counters.response_times.remove(0);
        }
        counters.response_times.push(report.elapsed_ms);
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Statistics for every website seen so far, sorted by website
    pub fn get_site_stats(&self) -> Vec<SiteStats> {
        let sites = self.sites.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats: Vec<SiteStats> = sites
            .iter()
            .map(|(website, c)| {
                let total = c.ok + c.empty + c.errors;
                SiteStats {
                    website: website.clone(),
                    searches: total,
                    ok: c.ok,
                    empty: c.empty,
                    errors: c.errors,
                    listings: c.listings,
                    avg_response_time_ms: if c.response_times.is_empty() {
                        None
                    } else {
                        Some(c.response_times.iter().sum::<u64>() / c.response_times.len() as u64)
                    },
                    reliability: if total == 0 {
                        100.0
                    } else {
                        ((c.ok + c.empty) as f64 / total as f64) * 100.0
                    },
                    last_error: c.last_error.clone(),
                }
            })
            .collect();
        stats.sort_by(|a, b| a.website.cmp(&b.website));
        stats
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single website
#[derive(Debug, Clone, Serialize)]
pub struct SiteStats {
    pub website: String,
    pub searches: u64,
    pub ok: u64,
    pub empty: u64,
    pub errors: u64,
    pub listings: u64,
    pub avg_response_time_ms: Option<u64>,
    /// Share of searches that did not error, in percent
    pub reliability: f64,
    pub last_error: Option<String>,
}
