//! Canonical ordering for article sequences.
//!
//! Every sequence exposed to the presentation layer — freshly merged pages
//! and the derived saved view alike — passes through [`normalize_order`], so
//! two code paths can never disagree about display order.

use crate::model::Article;

/// Sort articles by publication time, newest first.
///
/// Ties on `published_at` keep their input order (stable sort). Idempotent:
/// re-normalizing an already-normalized sequence is a no-op.
pub fn normalize_order(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}
