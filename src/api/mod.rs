pub mod http;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpBackend;
pub use models::{MovieSummary, NewReview, Review, SearchResult, NO_POSTER};

/// Everything that can go wrong talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}")]
    Status {
        status: u16,
        /// The `error` field of the response body, when the backend sent one
        message: Option<String>,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Human readable message supplied by the backend, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// The four endpoints the client consumes
#[async_trait]
pub trait Backend: Send + Sync {
    async fn search(&self, keyword: &str, page: u32) -> Result<SearchResult, ApiError>;

    async fn fetch_reviews(&self, title: &str) -> Result<Vec<Review>, ApiError>;

    async fn create_review(&self, review: &NewReview) -> Result<(), ApiError>;

    /// Only an exact 204 counts as success
    async fn delete_review(&self, id: i64) -> Result<(), ApiError>;
}
