//! Search orchestration module
//!
//! Coordinates extraction across the target websites and aggregates
//! their listings in site order.

mod executor;
mod models;

pub use executor::Search;
pub use models::*;
