//! Remote article collection service: the trait boundary and its HTTP
//! implementation.

mod http;
mod service;

pub use http::{HttpArticleService, MAX_PAGE_SIZE};
pub use service::{ArticleService, ServiceError, SortBy, SortOrder};
