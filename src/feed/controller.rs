//! The feed controller: intent handlers, spawned remote calls, and event
//! application.
//!
//! Controller methods mutate state synchronously and spawn tokio tasks for
//! remote calls; each task reports completion as a [`FeedEvent`] tagged with
//! the generation token current at spawn time. The consumer drains the
//! receiver handed out by [`FeedController::new`] and passes each event to
//! [`FeedController::handle_event`], which applies it only if its token is
//! still current. Descriptor change → reset → fetch is therefore a sequence
//! of explicit transitions, never an implicit recomputation.

use crate::feed::debounce::DebouncedSearch;
use crate::feed::generation::{GenerationTracker, QueryDescriptor, QueryKind};
use crate::feed::state::FeedState;
use crate::model::{Article, ArticlePage, CategoryCount};
use crate::remote::{ArticleService, ServiceError, SortBy, SortOrder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Buffered events between spawned tasks and the consumer's pump.
const EVENT_CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// Options
// ============================================================================

/// Tunables for the feed core.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Articles requested per page.
    pub page_size: u32,
    /// Quiet period before a typed query is issued.
    pub debounce: Duration,
    /// Server-side sort field for category listings.
    pub sort_by: SortBy,
    /// Server-side sort direction for category listings.
    pub sort_order: SortOrder,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            debounce: Duration::from_millis(300),
            sort_by: SortBy::PublishedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Completions and signals delivered to the consumer's event pump.
#[derive(Debug)]
pub enum FeedEvent {
    /// A page request finished (in either direction).
    ///
    /// `token` is the generation the request was spawned under; a token that
    /// is no longer current at application time makes the whole event a
    /// silent no-op.
    PageLoaded {
        token: u64,
        page: u32,
        result: Result<ArticlePage, ServiceError>,
    },
    /// A save/unsave confirmation returned.
    ///
    /// `saved` is the exact boolean the request asserted — used verbatim for
    /// rollback so out-of-order confirmations stay last-write-wins.
    SaveConfirmed {
        id: String,
        saved: bool,
        result: Result<(), ServiceError>,
    },
    /// The debounce quiet period elapsed for a typed query.
    SearchReady { text: String },
    /// The scroll sentinel crossed into view.
    LoadMoreRequested,
    /// The category list refresh finished.
    CategoriesLoaded {
        result: Result<Vec<CategoryCount>, ServiceError>,
    },
}

// ============================================================================
// Controller
// ============================================================================

/// Owns feed state and coordinates all remote calls.
///
/// Not `Clone` and not shared: one consumer task owns the controller, and all
/// mutation flows through it. Spawned tasks communicate only via the event
/// channel.
pub struct FeedController {
    service: Arc<dyn ArticleService>,
    options: FeedOptions,
    state: FeedState,
    tracker: GenerationTracker,
    debounce: DebouncedSearch,
    categories: Vec<CategoryCount>,
    event_tx: mpsc::Sender<FeedEvent>,
}

impl FeedController {
    /// Create a controller and the event receiver for the consumer's pump.
    pub fn new(
        service: Arc<dyn ArticleService>,
        options: FeedOptions,
    ) -> (Self, mpsc::Receiver<FeedEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let debounce = DebouncedSearch::new(event_tx.clone(), options.debounce);
        let controller = Self {
            service,
            options,
            state: FeedState::new(),
            tracker: GenerationTracker::new(),
            debounce,
            categories: Vec::new(),
            event_tx,
        };
        (controller, event_rx)
    }

    /// Sender for auxiliary signal sources (e.g. a
    /// [`crate::feed::ScrollTrigger`]).
    pub fn event_sender(&self) -> mpsc::Sender<FeedEvent> {
        self.event_tx.clone()
    }

    // ========================================================================
    // Snapshot accessors
    // ========================================================================

    /// The loaded article sequence, already in canonical order.
    pub fn articles(&self) -> &[Article] {
        self.state.articles()
    }

    /// The saved subsequence, derived on demand.
    pub fn saved_view(&self) -> Vec<Article> {
        self.state.saved_view()
    }

    /// Most recently refreshed category counts.
    pub fn categories(&self) -> &[CategoryCount] {
        &self.categories
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    pub fn total_count(&self) -> u64 {
        self.state.total_count()
    }

    pub fn page(&self) -> u32 {
        self.state.page()
    }

    /// The descriptor results are currently accumulated under.
    pub fn active_query(&self) -> Option<&QueryDescriptor> {
        self.tracker.active()
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Switch to a category listing. `None` selects the unfiltered collection.
    ///
    /// A different descriptor resets accumulated results and starts a new
    /// generation; re-selecting the active category refreshes page 1 unless a
    /// request is already in flight.
    pub fn select_category(&mut self, category: Option<&str>) {
        self.debounce.cancel();
        let begin = self.tracker.begin_query(QueryDescriptor::category(category));
        if begin.reset {
            self.state.reset();
        } else if self.state.loading() {
            tracing::debug!(?category, "Category reselected while request in flight");
            return;
        }
        self.load_page(begin.token, 1);
    }

    /// Issue a search immediately (explicit submit bypasses debouncing).
    ///
    /// Empty or whitespace-only text clears results synchronously with no
    /// remote call.
    pub fn search(&mut self, text: &str) {
        self.debounce.cancel();
        let text = text.trim();
        if text.is_empty() {
            self.clear_results();
            return;
        }
        let begin = self.tracker.begin_query(QueryDescriptor::search(text));
        if begin.reset {
            self.state.reset();
        } else if self.state.loading() {
            tracing::debug!(query = %text, "Search re-issued while request in flight");
            return;
        }
        self.load_page(begin.token, 1);
    }

    /// React to a keystroke in the search box.
    ///
    /// Empty text clears results synchronously; anything else (re)schedules
    /// the debounce timer, which emits [`FeedEvent::SearchReady`] after the
    /// quiet period.
    pub fn on_query_text_changed(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.debounce.cancel();
            self.clear_results();
            return;
        }
        self.debounce.schedule(text.to_string());
    }

    /// Request the next page under the current descriptor.
    ///
    /// No-op (not an error) while a request is in flight or when the last
    /// page has been reached — the guard that keeps scroll-triggered fetching
    /// down to one outstanding request.
    pub fn load_more(&mut self) {
        if self.state.loading() {
            tracing::debug!("load_more ignored: request already in flight");
            return;
        }
        if !self.state.has_more() {
            tracing::debug!("load_more ignored: no further pages");
            return;
        }
        if self.tracker.active().is_none() {
            tracing::debug!("load_more ignored: no active query");
            return;
        }
        let token = self.tracker.current_token();
        self.load_page(token, self.state.page() + 1);
    }

    /// Optimistically toggle an article's saved flag.
    ///
    /// The local flag flips immediately; the remote confirmation carries the
    /// new desired value. Not present in the loaded feed → no-op. Rapid
    /// toggles are last-write-wins.
    pub fn toggle_saved(&mut self, id: &str) {
        let Some(current) = self.state.saved(id) else {
            tracing::debug!(article_id = %id, "toggle_saved ignored: article not loaded");
            return;
        };
        let desired = !current;
        self.state.set_saved(id, desired);
        tracing::debug!(article_id = %id, saved = desired, "Optimistically toggled saved flag");

        let service = Arc::clone(&self.service);
        let tx = self.event_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = service.set_saved(&id, desired).await;
            let event = FeedEvent::SaveConfirmed {
                id,
                saved: desired,
                result,
            };
            if let Err(e) = tx.send(event).await {
                tracing::warn!(error = %e, "Failed to deliver save confirmation (receiver dropped)");
            }
        });
    }

    /// Refresh the category counts for the consumer's filter bar.
    pub fn refresh_categories(&mut self) {
        let service = Arc::clone(&self.service);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = service.list_categories().await;
            if let Err(e) = tx.send(FeedEvent::CategoriesLoaded { result }).await {
                tracing::warn!(error = %e, "Failed to deliver category list (receiver dropped)");
            }
        });
    }

    // ========================================================================
    // Event application
    // ========================================================================

    /// Apply one completed event to feed state.
    ///
    /// Stale page responses (token no longer current) are discarded silently:
    /// they are an expected consequence of navigation speed, not a failure.
    pub fn handle_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::PageLoaded { token, page, result } => {
                if !self.tracker.is_current(token) {
                    tracing::debug!(token, page, "Discarding stale page response");
                    return;
                }
                self.state.set_loading(false);
                match result {
                    Ok(loaded) => {
                        tracing::debug!(
                            page,
                            fetched = loaded.articles.len(),
                            total = loaded.total_count,
                            "Applying loaded page"
                        );
                        self.state.apply_page(page, loaded);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, page, "Page load failed");
                        self.state
                            .set_error(format!("Failed to load articles: {}", e));
                    }
                }
            }
            FeedEvent::SaveConfirmed { id, saved, result } => {
                if let Err(e) = result {
                    tracing::warn!(
                        article_id = %id,
                        error = %e,
                        "Save confirmation failed, rolling back"
                    );
                    // Revert to the exact pre-toggle value of the request
                    // that failed; a later toggle's confirmation stands on
                    // its own
                    self.state.set_saved(&id, !saved);
                    self.state
                        .set_error(format!("Failed to update saved state: {}", e));
                }
            }
            FeedEvent::SearchReady { text } => self.search(&text),
            FeedEvent::LoadMoreRequested => self.load_more(),
            FeedEvent::CategoriesLoaded { result } => match result {
                Ok(categories) => self.categories = categories,
                Err(e) => tracing::warn!(error = %e, "Category refresh failed"),
            },
        }
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn clear_results(&mut self) {
        self.tracker.invalidate();
        self.state.reset();
        tracing::debug!("Cleared results for empty query");
    }

    /// Spawn a page load under the active descriptor, tagged with `token`.
    fn load_page(&mut self, token: u64, page: u32) {
        let Some(descriptor) = self.tracker.active().cloned() else {
            tracing::debug!("No active query descriptor, nothing to load");
            return;
        };

        self.state.set_loading(true);
        self.state.clear_error();

        let service = Arc::clone(&self.service);
        let page_size = self.options.page_size;
        let sort_by = self.options.sort_by;
        let sort_order = self.options.sort_order;
        let tx = self.event_tx.clone();

        tracing::debug!(token, page, ?descriptor, "Spawning page load");
        tokio::spawn(async move {
            let result = match descriptor.kind {
                QueryKind::Category => {
                    service
                        .list_articles(
                            descriptor.category_filter(),
                            page,
                            page_size,
                            sort_by,
                            sort_order,
                        )
                        .await
                }
                QueryKind::Search => {
                    service.search_articles(&descriptor.value, page, page_size).await
                }
            };
            let event = FeedEvent::PageLoaded { token, page, result };
            if let Err(e) = tx.send(event).await {
                tracing::warn!(error = %e, "Failed to deliver page load result (receiver dropped)");
            }
        });
    }
}
