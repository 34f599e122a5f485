//! Accumulated feed state: the article sequence, pagination cursor, and the
//! flags the presentation layer reads.

use crate::feed::ordering::normalize_order;
use crate::model::{Article, ArticlePage};
use std::collections::HashSet;

/// Client-side state for the current query's results.
///
/// Invariants:
/// - `articles` never contains two entries with the same id.
/// - `articles` is always in the canonical order (newest first).
/// - A failed load leaves `articles` untouched.
#[derive(Debug)]
pub struct FeedState {
    articles: Vec<Article>,
    page: u32,
    has_more: bool,
    total_count: u64,
    loading: bool,
    error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedState {
    /// Empty state, positioned before page 1.
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            page: 1,
            has_more: true,
            total_count: 0,
            loading: false,
            error: None,
        }
    }

    /// Clear accumulated results for a new query descriptor.
    pub fn reset(&mut self) {
        self.articles.clear();
        self.page = 1;
        self.has_more = true;
        self.total_count = 0;
        self.loading = false;
        self.error = None;
    }

    // ========================================================================
    // Snapshot accessors
    // ========================================================================

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// The saved subsequence, in canonical order.
    ///
    /// Derived, never stored: it reflects whatever has been loaded into the
    /// feed and is not independently paginated.
    pub fn saved_view(&self) -> Vec<Article> {
        let mut saved: Vec<Article> = self
            .articles
            .iter()
            .filter(|a| a.saved)
            .cloned()
            .collect();
        normalize_order(&mut saved);
        saved
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ========================================================================
    // Mutations (feed core only)
    // ========================================================================

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    /// Merge a successfully loaded page.
    ///
    /// Page 1 replaces the sequence; later pages append, dropping any article
    /// whose id is already present (defensive against an overlapping
    /// in-flight duplicate page). The merged sequence is re-normalized so the
    /// order never depends on arrival interleaving.
    pub(crate) fn apply_page(&mut self, page: u32, loaded: ArticlePage) {
        if page <= 1 {
            self.articles = loaded.articles;
        } else {
            let known: HashSet<String> =
                self.articles.iter().map(|a| a.id.clone()).collect();
            let incoming = loaded.articles.len();
            let mut fresh: Vec<Article> = loaded
                .articles
                .into_iter()
                .filter(|a| !known.contains(a.id.as_str()))
                .collect();
            let dropped = incoming - fresh.len();
            if dropped > 0 {
                tracing::debug!(page, dropped, "Dropped duplicate articles while appending page");
            }
            self.articles.append(&mut fresh);
        }

        normalize_order(&mut self.articles);
        self.page = page;
        self.has_more = page < loaded.total_pages;
        self.total_count = loaded.total_count;
        self.error = None;
    }

    /// Current saved flag for an article, or `None` if it is not loaded.
    pub(crate) fn saved(&self, id: &str) -> Option<bool> {
        self.articles.iter().find(|a| a.id == id).map(|a| a.saved)
    }

    /// Set an article's saved flag. Returns false if the article is not loaded.
    pub(crate) fn set_saved(&mut self, id: &str, saved: bool) -> bool {
        match self.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.saved = saved;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(id: &str, secs: i64) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Article {}", id),
            summary: String::new(),
            category: "tech".to_string(),
            source: "Wire".to_string(),
            published_at: Utc.timestamp_opt(secs, 0).unwrap(),
            saved: false,
            view_count: 0,
            image_url: None,
            read_time_minutes: None,
        }
    }

    fn page(articles: Vec<Article>, total_count: u64, total_pages: u32) -> ArticlePage {
        ArticlePage {
            articles,
            total_count,
            page: 1,
            page_size: 20,
            total_pages,
        }
    }

    #[test]
    fn page_one_replaces_existing_results() {
        let mut state = FeedState::new();
        state.apply_page(1, page(vec![article("a", 100)], 1, 1));
        state.apply_page(1, page(vec![article("b", 200)], 1, 1));

        assert_eq!(state.articles().len(), 1);
        assert_eq!(state.articles()[0].id, "b");
    }

    #[test]
    fn later_pages_append_in_canonical_order() {
        let mut state = FeedState::new();
        state.apply_page(1, page(vec![article("a", 300), article("b", 200)], 4, 2));
        state.apply_page(2, page(vec![article("c", 400), article("d", 100)], 4, 2));

        let ids: Vec<_> = state.articles().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b", "d"]);
        assert_eq!(state.page(), 2);
        assert!(!state.has_more());
    }

    #[test]
    fn append_deduplicates_by_id() {
        let mut state = FeedState::new();
        state.apply_page(1, page(vec![article("a", 300), article("b", 200)], 3, 2));
        // Overlapping page: "b" again plus a new article
        state.apply_page(2, page(vec![article("b", 200), article("c", 100)], 3, 2));

        let ids: Vec<_> = state.articles().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn has_more_tracks_total_pages() {
        let mut state = FeedState::new();
        state.apply_page(1, page(vec![article("a", 100)], 60, 3));
        assert!(state.has_more());
        assert_eq!(state.total_count(), 60);

        state.apply_page(3, page(vec![article("b", 50)], 60, 3));
        assert!(!state.has_more());
    }

    #[test]
    fn empty_result_set_has_no_more_pages() {
        let mut state = FeedState::new();
        state.apply_page(1, page(vec![], 0, 0));
        assert!(!state.has_more());
        assert_eq!(state.total_count(), 0);
    }

    #[test]
    fn reset_restores_initial_lifecycle() {
        let mut state = FeedState::new();
        state.apply_page(1, page(vec![article("a", 100)], 60, 3));
        state.set_error("boom".to_string());

        state.reset();
        assert!(state.articles().is_empty());
        assert_eq!(state.page(), 1);
        assert!(state.has_more());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn saved_view_is_ordered_saved_subset() {
        let mut state = FeedState::new();
        state.apply_page(
            1,
            page(vec![article("a", 100), article("b", 300), article("c", 200)], 3, 1),
        );
        assert!(state.set_saved("a", true));
        assert!(state.set_saved("b", true));

        let saved = state.saved_view();
        let ids: Vec<_> = saved.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn set_saved_unknown_id_is_rejected() {
        let mut state = FeedState::new();
        assert!(!state.set_saved("missing", true));
        assert_eq!(state.saved("missing"), None);
    }

    #[test]
    fn successful_page_clears_previous_error() {
        let mut state = FeedState::new();
        state.set_error("transient".to_string());
        state.apply_page(1, page(vec![article("a", 100)], 1, 1));
        assert_eq!(state.error(), None);
    }
}
