//! API error taxonomy
//!
//! Every error renders as `{"detail": "<message>"}`; the status code tells
//! callers which class of failure occurred.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Request failed a field constraint
    Validation(String),

    /// Request could not be extracted (bad JSON, missing field, bad query string)
    Rejected { status: StatusCode, message: String },

    /// Per-minute request quota exhausted
    RateLimited,

    /// Search failed after the request was accepted
    Search(String),

    /// Listing stored searches failed
    RecentSearches(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "{}", msg),
            ApiError::Rejected { message, .. } => write!(f, "{}", message),
            ApiError::RateLimited => write!(f, "Rate limit exceeded, please retry later"),
            ApiError::Search(msg) => {
                write!(f, "An error occurred while searching for assets: {}", msg)
            }
            ApiError::RecentSearches(msg) => write!(
                f,
                "An error occurred while retrieving recent searches: {}",
                msg
            ),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected { status, .. } => *status,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Search(_) | ApiError::RecentSearches(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn validation(err: impl fmt::Display) -> Self {
        ApiError::Validation(err.to_string())
    }

    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn search(err: impl fmt::Display) -> Self {
        ApiError::Search(err.to_string())
    }

    pub fn recent_searches(err: impl fmt::Display) -> Self {
        ApiError::RecentSearches(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", self);
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
