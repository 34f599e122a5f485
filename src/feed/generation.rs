//! Query descriptors and the generation token tracker.
//!
//! The tracker is the system's sole ordering mechanism: every outgoing page
//! request is tagged with the token current at spawn time, and a completed
//! response is applied only if its token is still current. A slow response
//! from a category the user has since navigated away from can therefore
//! never repopulate the feed.

// ============================================================================
// Query Descriptor
// ============================================================================

/// Which kind of logical query is driving pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Category-filtered (or unfiltered) listing.
    Category,
    /// Full-text search.
    Search,
}

/// The logical identity of the current query.
///
/// A category name (empty string = unfiltered) or a search term. Two
/// descriptors are the same query iff both kind and value match; any change
/// invalidates all in-flight requests of the previous descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub kind: QueryKind,
    pub value: String,
}

impl QueryDescriptor {
    /// Category listing. `None` selects the unfiltered collection.
    pub fn category(name: Option<&str>) -> Self {
        Self {
            kind: QueryKind::Category,
            value: name.unwrap_or_default().to_string(),
        }
    }

    /// Full-text search for the given term.
    pub fn search(text: &str) -> Self {
        Self {
            kind: QueryKind::Search,
            value: text.to_string(),
        }
    }

    /// The category filter to send to the remote service, if any.
    pub(crate) fn category_filter(&self) -> Option<&str> {
        match self.kind {
            QueryKind::Category if !self.value.is_empty() => Some(&self.value),
            _ => None,
        }
    }
}

// ============================================================================
// Generation Tracker
// ============================================================================

/// Result of starting (or continuing) a logical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeginQuery {
    /// Token to tag the outgoing request with.
    pub token: u64,
    /// True when the descriptor changed: the caller must clear accumulated
    /// results and restart from page 1.
    pub reset: bool,
}

/// Issues monotonically increasing tokens per logical query.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    current: u64,
    active: Option<QueryDescriptor>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a query under the given descriptor.
    ///
    /// A descriptor differing from the active one bumps the token and signals
    /// a reset; re-issuing the active descriptor returns the current token
    /// unchanged (continuation, e.g. the next page).
    pub fn begin_query(&mut self, descriptor: QueryDescriptor) -> BeginQuery {
        if self.active.as_ref() == Some(&descriptor) {
            return BeginQuery {
                token: self.current,
                reset: false,
            };
        }

        self.current = self.current.wrapping_add(1);
        tracing::debug!(token = self.current, ?descriptor, "New query generation");
        self.active = Some(descriptor);
        BeginQuery {
            token: self.current,
            reset: true,
        }
    }

    /// Whether a response carrying `token` may still be applied.
    pub fn is_current(&self, token: u64) -> bool {
        token == self.current
    }

    /// Token of the active generation.
    pub fn current_token(&self) -> u64 {
        self.current
    }

    /// The descriptor results are currently accumulated under.
    pub fn active(&self) -> Option<&QueryDescriptor> {
        self.active.as_ref()
    }

    /// Invalidate all in-flight requests without starting a new query.
    ///
    /// Used when results are cleared synchronously (empty search text): any
    /// response still in flight must be discarded, and the next
    /// `begin_query` must signal a reset.
    pub fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
        self.active = None;
        tracing::debug!(token = self.current, "Generation invalidated");
    }
}
