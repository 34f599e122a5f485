//! Wire types shared between the remote service contract and the feed core.
//!
//! Field names follow the remote API's camelCase JSON. Articles are owned by
//! the remote service; the client holds a cached copy per id, mutable only
//! for the `saved` flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Article
// ============================================================================

/// A single summarized article as served by the collection endpoint.
///
/// Identity is the opaque `id` string, stable across requests. `published_at`
/// drives the canonical display order. `saved` is the only field the client
/// mutates locally (optimistically, confirmed against the remote service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub read_time_minutes: Option<u32>,
}

// ============================================================================
// Paged responses
// ============================================================================

/// One page of a paginated article query.
///
/// `total_pages` is computed server-side from `total_count` and `page_size`;
/// the client derives `has_more` by comparing the requested page against it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// A category name with its article count, for the consumer's filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}
