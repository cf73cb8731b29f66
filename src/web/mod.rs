//! Web server module
//!
//! Provides the HTTP API for asset-search.

mod error;
mod handlers;
mod limiter;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
