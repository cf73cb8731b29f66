//! Per-website extraction with retry

use super::prompt::build_prompt;
use super::retry::RetryPolicy;
use crate::llm::{CompletionClient, LlmError};
use crate::results::{SearchResult, SiteReport, SiteStatus};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Failure of a single extraction attempt
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model reply is not a JSON list of listings: {0}")]
    MalformedReply(#[from] serde_json::Error),

    #[error("extraction attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Listings from one website plus how the call went
#[derive(Debug, Clone)]
pub struct SiteResults {
    pub report: SiteReport,
    pub results: Vec<SearchResult>,
}

/// Asks the model to search one website at a time
#[derive(Clone)]
pub struct SiteExtractor {
    client: Arc<dyn CompletionClient>,
    max_tokens: u32,
    policy: RetryPolicy,
    attempt_timeout: Option<Duration>,
}

impl SiteExtractor {
    pub fn new(client: Arc<dyn CompletionClient>, max_tokens: u32) -> Self {
        Self {
            client,
            max_tokens,
            policy: RetryPolicy::default(),
            attempt_timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_attempt_timeout(mut self, limit: Option<Duration>) -> Self {
        self.attempt_timeout = limit;
        self
    }

    /// Search `website_url` for `asset_description`.
    ///
    /// Never fails: when every attempt errors the site contributes no
    /// listings and the report carries the last error.
    pub async fn search_website(&self, website_url: &str, asset_description: &str) -> SiteResults {
        let start = Instant::now();
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;
            match self.attempt(website_url, asset_description).await {
                Ok(results) => break Ok(results),
                Err(e) if attempt < self.policy.max_attempts => {
                    let wait = self.policy.wait_after(attempt);
                    warn!(
                        website = website_url,
                        attempt,
                        error = %e,
                        "extraction attempt failed, retrying in {:?}",
                        wait
                    );
                    sleep(wait).await;
                }
                Err(e) => break Err(e),
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let (status, results) = match outcome {
            Ok(results) if results.is_empty() => (SiteStatus::Empty, results),
            Ok(results) => (SiteStatus::Ok, results),
            Err(e) => {
                warn!(
                    website = website_url,
                    attempts = attempt,
                    error = %e,
                    "giving up on website"
                );
                (SiteStatus::Error(e.to_string()), Vec::new())
            }
        };

        debug!(
            website = website_url,
            count = results.len(),
            elapsed_ms,
            "website search finished"
        );

        SiteResults {
            report: SiteReport {
                website: website_url.to_string(),
                status,
                result_count: results.len(),
                attempts: attempt,
                elapsed_ms,
            },
            results,
        }
    }

    async fn attempt(
        &self,
        website_url: &str,
        asset_description: &str,
    ) -> Result<Vec<SearchResult>, ExtractionError> {
        let call = async {
            let prompt = build_prompt(website_url, asset_description, self.max_tokens);
            let reply = self.client.complete(&prompt, self.max_tokens).await?;
            Ok::<_, ExtractionError>(SearchResult::parse_list(&reply)?)
        };

        match self.attempt_timeout {
            Some(limit) => timeout(limit, call)
                .await
                .map_err(|_| ExtractionError::Timeout(limit))?,
            None => call.await,
        }
    }
}
