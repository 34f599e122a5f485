//! The remote article collection contract consumed by the feed core.
//!
//! The core never talks HTTP directly; it goes through [`ArticleService`] so
//! tests can substitute a scripted implementation with controllable response
//! timing. The production implementation is [`crate::remote::HttpArticleService`].

use crate::model::{ArticlePage, CategoryCount};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from the remote article service.
///
/// Staleness is deliberately absent: a response that arrives after its query
/// descriptor was superseded is a normal outcome handled by the feed core's
/// generation check, not a service failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Base URL could not be parsed or uses an unsupported scheme
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

// ============================================================================
// Sort parameters
// ============================================================================

/// Server-side sort field for article listings.
///
/// Mirrors the fields the collection endpoint accepts; anything else falls
/// back to publication date on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    PublishedAt,
    Title,
    Source,
    Category,
    ViewCount,
}

impl SortBy {
    pub(crate) fn as_query(self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Title => "title",
            SortBy::Source => "source",
            SortBy::Category => "category",
            SortBy::ViewCount => "viewCount",
        }
    }
}

/// Sort direction for article listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn as_query(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

// ============================================================================
// Service Trait
// ============================================================================

/// Remote article collection service.
///
/// Semantic contract only — implementations decide the wire format. All
/// operations are cancel-safe from the caller's perspective: the feed core
/// may drop the effect of any completed call via its generation check.
#[async_trait]
pub trait ArticleService: Send + Sync {
    /// Fetch one page of articles, optionally filtered by category.
    ///
    /// `category: None` means the unfiltered collection.
    async fn list_articles(
        &self,
        category: Option<&str>,
        page: u32,
        page_size: u32,
        sort_by: SortBy,
        sort_order: SortOrder,
    ) -> Result<ArticlePage, ServiceError>;

    /// Full-text search over titles and summaries.
    async fn search_articles(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ArticlePage, ServiceError>;

    /// All known categories with their article counts.
    async fn list_categories(&self) -> Result<Vec<CategoryCount>, ServiceError>;

    /// Set an article's saved flag to an exact desired value.
    ///
    /// The value semantics matter for the optimistic mutation layer: the
    /// call asserts the boolean it was sent with, never "toggle again", so
    /// out-of-order confirmations stay idempotent.
    async fn set_saved(&self, id: &str, saved: bool) -> Result<(), ServiceError>;
}
