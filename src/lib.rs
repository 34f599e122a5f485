//! brief — feed synchronization core for a machine-summarized news reading
//! list.
//!
//! The crate owns the client-side logic between a remote article collection
//! service and a presentation layer: paged fetching, reconciliation with
//! optimistic save/unsave edits, debounced search, and scroll-triggered
//! incremental loading — all kept consistent across out-of-order responses
//! by generation-token invalidation.
//!
//! # Example
//!
//! ```no_run
//! use brief::feed::{FeedController, FeedOptions};
//! use brief::remote::HttpArticleService;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let service = HttpArticleService::new(
//!     "http://localhost:8000",
//!     None,
//!     Duration::from_secs(30),
//! )?;
//! let (mut controller, mut events) =
//!     FeedController::new(Arc::new(service), FeedOptions::default());
//!
//! controller.select_category(Some("tech"));
//! while let Some(event) = events.recv().await {
//!     controller.handle_event(event);
//!     if !controller.is_loading() {
//!         break;
//!     }
//! }
//! for article in controller.articles() {
//!     println!("{}  {}", article.published_at, article.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod feed;
pub mod model;
pub mod remote;

pub use config::Config;
pub use feed::{FeedController, FeedEvent, FeedOptions};
pub use model::{Article, ArticlePage, CategoryCount};
pub use remote::{ArticleService, HttpArticleService, ServiceError};
