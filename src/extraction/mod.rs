//! Website extraction module
//!
//! Builds the per-website prompt, dispatches it to the model with bounded
//! retry and backoff, and parses the reply into listings.

mod prompt;
mod retry;
mod site;

pub use prompt::build_prompt;
pub use retry::RetryPolicy;
pub use site::{ExtractionError, SiteExtractor, SiteResults};
