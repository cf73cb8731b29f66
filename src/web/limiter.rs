//! Request rate limiting for the API routes

use super::error::ApiError;
use super::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

/// Token bucket refilled at `per_minute` requests per minute; `None` when disabled
pub fn build_limiter(per_minute: u32) -> Option<DefaultDirectRateLimiter> {
    NonZeroU32::new(per_minute).map(|n| RateLimiter::direct(Quota::per_minute(n)))
}

/// Middleware rejecting requests once the bucket is empty
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(limiter) = state.limiter.as_deref() {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded for {}", request.uri().path());
            return ApiError::RateLimited.into_response();
        }
    }
    next.run(request).await
}
