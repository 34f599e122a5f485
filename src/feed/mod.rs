//! The feed synchronization core.
//!
//! Leaf-first: [`ordering`] imposes the canonical article order,
//! [`generation`] invalidates superseded queries, [`state`] accumulates
//! pages, [`debounce`] coalesces keystrokes, [`scroll`] abstracts the
//! sentinel boundary, and [`controller`] ties them together behind the
//! consumer-facing intent/snapshot contract.

pub mod controller;
pub mod debounce;
pub mod generation;
pub mod ordering;
pub mod scroll;
pub mod state;

pub use controller::{FeedController, FeedEvent, FeedOptions};
pub use debounce::DebouncedSearch;
pub use generation::{BeginQuery, GenerationTracker, QueryDescriptor, QueryKind};
pub use ordering::normalize_order;
pub use scroll::{ScrollTrigger, SentinelObserver, VisibilityHandler};
pub use state::FeedState;
