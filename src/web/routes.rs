//! Route definitions

use super::handlers;
use super::limiter;
use super::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rate limited API routes
    let api = Router::new()
        .route("/api/search", post(handlers::search_assets))
        .route("/api/recent-searches", get(handlers::recent_searches))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limiter::rate_limit,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/docs", get(handlers::docs))
        .route("/api/redoc", get(handlers::docs))
        .route("/api/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .merge(api)
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}
