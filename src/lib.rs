//! Asset-Search: construction equipment search over industry listing sites
//!
//! An HTTP API that hands an asset description to a language model, once per
//! configured listing website, aggregates the listings it extracts, and keeps
//! every search on disk as JSON and CSV.

pub mod config;
pub mod extraction;
pub mod llm;
pub mod metrics;
pub mod results;
pub mod search;
pub mod storage;
pub mod web;

pub use config::Settings;
pub use results::{AssetSpecification, SearchOutcome, SearchResult};
pub use search::{Search, SearchRequest, SearchResponse};
pub use storage::Storage;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent sent to the model API
pub const USER_AGENT: &str = concat!("asset-search/", env!("CARGO_PKG_VERSION"));
