//! Search execution and orchestration

use crate::config::Settings;
use crate::extraction::{RetryPolicy, SiteExtractor};
use crate::llm::CompletionClient;
use crate::metrics::Metrics;
use crate::results::SearchOutcome;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Search orchestrator that fans one asset description out to every target website
pub struct Search {
    extractor: SiteExtractor,
    websites: Vec<String>,
    /// Sites searched at once
    concurrency: usize,
    metrics: Arc<Metrics>,
}

impl Search {
    /// Create a new orchestrator over `websites`, one site at a time
    pub fn new(extractor: SiteExtractor, websites: Vec<String>) -> Self {
        Self {
            extractor,
            websites,
            concurrency: 1,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Build the orchestrator described by `settings`
    pub fn from_settings(settings: &Settings, client: Arc<dyn CompletionClient>) -> Self {
        let extractor = SiteExtractor::new(client, settings.anthropic.max_tokens)
            .with_policy(RetryPolicy::from(&settings.search.retry))
            .with_attempt_timeout(settings.search.site_timeout());

        Self::new(extractor, settings.search.target_websites.clone())
            .with_concurrency(settings.search.max_concurrent_sites)
    }

    /// Allow up to `limit` websites to be searched concurrently
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Share a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn websites(&self) -> &[String] {
        &self.websites
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Search every target website and concatenate the listings in site order.
    ///
    /// Sites that fail contribute nothing; the search itself never fails.
    pub async fn search_all_websites(&self, asset_description: &str) -> SearchOutcome {
        info!(
            "Searching {} websites for '{}'",
            self.websites.len(),
            asset_description
        );
        self.metrics.inc_search();

        let pending: Vec<_> = self
            .websites
            .iter()
            .map(|website| self.extractor.search_website(website, asset_description))
            .collect();
        // `buffered` yields in input order regardless of completion order
        let mut sites = stream::iter(pending).buffered(self.concurrency);

        let mut outcome = SearchOutcome::new();
        while let Some(site) = sites.next().await {
            self.metrics.record_site(&site.report);
            outcome.add_site(site.report, site.results);
        }

        let failed = outcome.failed_sites().len();
        if failed > 0 {
            warn!(
                "{} of {} websites failed for '{}'",
                failed,
                self.websites.len(),
                asset_description
            );
        }
        info!(
            "Search for '{}' gathered {} results",
            asset_description,
            outcome.result_count()
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::results::SiteStatus;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Answers with `per_site` listings for each site, failing for sites containing "down"
    struct PerSite {
        per_site: usize,
        delay_for_first: Duration,
    }

    #[async_trait]
    impl CompletionClient for PerSite {
        async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            let site = prompt
                .split("following website: ")
                .nth(1)
                .and_then(|rest| rest.split(".\n").next())
                .unwrap_or_default()
                .to_string();
            if site.contains("down") {
                return Err(LlmError::RateLimited);
            }
            if site.contains("first") {
                tokio::time::sleep(self.delay_for_first).await;
            }
            let items: Vec<_> = (1..=self.per_site)
                .map(|n| {
                    serde_json::json!({
                        "description": format!("listing {}", n),
                        "location": "Raleigh, NC",
                        "website": site,
                    })
                })
                .collect();
            Ok(serde_json::to_string(&items).unwrap())
        }
    }

    fn search(sites: &[&str], per_site: usize) -> Search {
        let client = Arc::new(PerSite {
            per_site,
            delay_for_first: Duration::from_millis(30),
        });
        let extractor = SiteExtractor::new(client, 1000).with_policy(RetryPolicy::immediate(3));
        Search::new(extractor, sites.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn test_concatenates_in_site_order() {
        let search = search(
            &["https://first.example.com", "https://second.example.com", "https://third.example.com"],
            3,
        );
        let outcome = search.search_all_websites("Volvo A40 1500 HPY").await;

        assert_eq!(outcome.result_count(), 9);
        let websites: Vec<_> = outcome.results().iter().map(|r| r.website.as_str()).collect();
        assert_eq!(&websites[..3], &["https://first.example.com"; 3]);
        assert_eq!(&websites[6..], &["https://third.example.com"; 3]);
        assert_eq!(outcome.results()[1].description, "listing 2");
    }

    #[tokio::test]
    async fn test_concurrent_fan_out_keeps_order() {
        let search = search(
            &["https://first.example.com", "https://second.example.com"],
            2,
        )
        .with_concurrency(4);
        let outcome = search.search_all_websites("loader").await;

        let websites: Vec<_> = outcome.results().iter().map(|r| r.website.as_str()).collect();
        assert_eq!(
            websites,
            vec![
                "https://first.example.com",
                "https://first.example.com",
                "https://second.example.com",
                "https://second.example.com",
            ]
        );
    }

    #[tokio::test]
    async fn test_search_runs_on_spawned_task() {
        let search = Arc::new(
            search(&["https://first.example.com", "https://second.example.com"], 1)
                .with_concurrency(2),
        );
        let handle = tokio::spawn({
            let search = search.clone();
            async move {
                let description = String::from("Volvo A40");
                search.search_all_websites(&description).await
            }
        });

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.result_count(), 2);
        assert_eq!(search.metrics().get_total_searches(), 1);
    }

    #[tokio::test]
    async fn test_failing_sites_are_absorbed() {
        let search = search(&["https://down.example.com", "https://up.example.com"], 1);
        let outcome = search.search_all_websites("loader").await;

        assert_eq!(outcome.result_count(), 1);
        assert_eq!(outcome.sites().len(), 2);
        assert!(matches!(outcome.sites()[0].status, SiteStatus::Error(_)));
        assert_eq!(outcome.sites()[0].attempts, 3);
        assert_eq!(outcome.sites()[1].status, SiteStatus::Ok);
        assert_eq!(search.metrics().get_total_searches(), 1);
    }

    #[tokio::test]
    async fn test_every_site_failing_yields_empty_outcome() {
        let search = search(&["https://down.example.com", "https://also-down.example.com"], 1);
        let outcome = search.search_all_websites("Test request").await;

        assert_eq!(outcome.result_count(), 0);
        assert_eq!(outcome.failed_sites().len(), 2);
    }

    #[test]
    fn test_from_settings() {
        struct Never;
        #[async_trait]
        impl CompletionClient for Never {
            async fn complete(&self, _: &str, _: u32) -> Result<String, LlmError> {
                Err(LlmError::EmptyReply)
            }
        }

        let mut settings = Settings::default();
        settings.search.max_concurrent_sites = 3;
        let search = Search::from_settings(&settings, Arc::new(Never));
        assert_eq!(search.websites().len(), 7);
        assert_eq!(search.concurrency, 3);
    }
}
