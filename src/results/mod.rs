//! Result types and container for search results
//!
//! Defines the listing structures returned by the model and the
//! per-search aggregation of those listings.

mod container;
mod types;

pub use container::{SearchOutcome, SiteReport, SiteStatus};
pub use types::*;
