//! reqwest-backed [`ArticleService`] implementation.
//!
//! Speaks the collection backend's REST surface: snake_case query parameters,
//! camelCase JSON bodies, and a `{status, data}` envelope around the
//! categories and save endpoints.

use crate::model::{ArticlePage, CategoryCount};
use crate::remote::service::{ArticleService, ServiceError, SortBy, SortOrder};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Hard bound on page size, matching the backend's validation range.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Response bodies above this size are rejected outright.
const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

const API_PREFIX: &str = "api/v1";

/// Envelope used by the categories and save endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)] // "success" on every 2xx; kept so the shape round-trips
    status: String,
    data: T,
}

/// HTTP client for the article collection service.
///
/// Cheap to clone (the inner `reqwest::Client` is reference-counted); one
/// instance is shared between the feed controller's spawned load tasks.
#[derive(Debug, Clone)]
pub struct HttpArticleService {
    client: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
}

impl HttpArticleService {
    /// Build a service client for the given base URL.
    ///
    /// The URL must be absolute with an `http` or `https` scheme. An API key,
    /// when provided, is sent as `X-API-Key` on every request. `request_timeout`
    /// bounds each individual call; an exceeded budget surfaces as
    /// [`ServiceError::Timeout`].
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        request_timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ServiceError::InvalidBaseUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(key) = api_key {
            let value = reqwest::header::HeaderValue::from_str(key)
                .map_err(|_| ServiceError::InvalidBaseUrl("API key is not valid ASCII".into()))?;
            headers.insert("X-API-Key", value);
        }

        let client = reqwest::Client::builder()
            .redirect(Policy::limited(3))
            .default_headers(headers)
            .build()
            .map_err(ServiceError::Network)?;

        Ok(Self {
            client,
            base_url: parsed,
            request_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(&format!("{}/{}", API_PREFIX, path))
            .map_err(|e| ServiceError::InvalidBaseUrl(e.to_string()))
    }

    /// Send a request with the timeout budget and map non-2xx statuses.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let response = tokio::time::timeout(self.request_timeout, request.send())
            .await
            .map_err(|_| ServiceError::Timeout)?
            .map_err(ServiceError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ArticleService for HttpArticleService {
    async fn list_articles(
        &self,
        category: Option<&str>,
        page: u32,
        page_size: u32,
        sort_by: SortBy,
        sort_order: SortOrder,
    ) -> Result<ArticlePage, ServiceError> {
        let url = self.endpoint("articles")?;
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

        let mut request = self.client.get(url).query(&[
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
            ("sort_by", sort_by.as_query().to_string()),
            ("sort_order", sort_order.as_query().to_string()),
        ]);
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }

        tracing::debug!(?category, page, page_size, "Listing articles");
        let response = self.execute(request).await?;
        Self::decode::<ArticlePage>(response).await
    }

    async fn search_articles(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ArticlePage, ServiceError> {
        let url = self.endpoint("articles/search")?;
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

        let request = self.client.get(url).query(&[
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ]);

        tracing::debug!(query = %query, page, "Searching articles");
        let response = self.execute(request).await?;
        Self::decode::<ArticlePage>(response).await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryCount>, ServiceError> {
        let url = self.endpoint("categories")?;
        let response = self.execute(self.client.get(url)).await?;
        let envelope: Envelope<Vec<CategoryCount>> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    async fn set_saved(&self, id: &str, saved: bool) -> Result<(), ServiceError> {
        let url = self.endpoint(&format!("article/{}/save", id))?;
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "saved": saved }));

        tracing::debug!(article_id = %id, saved, "Confirming saved state");
        let response = self.execute(request).await?;
        // Body is {status, data: {id, saved}}; a 2xx with a well-formed
        // envelope is the confirmation
        let _: Envelope<serde_json::Value> = Self::decode(response).await?;
        Ok(())
    }
}

/// Read a response body with a size cap, rejecting oversized payloads before
/// they are buffered in full.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ServiceError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ServiceError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ServiceError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ServiceError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_PAGE: &str = r#"{
        "articles": [],
        "totalCount": 0,
        "page": 1,
        "pageSize": 20,
        "totalPages": 0
    }"#;

    fn page_body(count: usize) -> serde_json::Value {
        let articles: Vec<_> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "id": format!("a{}", i),
                    "title": format!("Article {}", i),
                    "summary": "Summary",
                    "category": "tech",
                    "source": "Wire",
                    "publishedAt": "2024-06-01T12:00:00Z"
                })
            })
            .collect();
        serde_json::json!({
            "articles": articles,
            "totalCount": count,
            "page": 1,
            "pageSize": 20,
            "totalPages": 1
        })
    }

    fn service(uri: &str) -> HttpArticleService {
        HttpArticleService::new(uri, None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = HttpArticleService::new("ftp://example.com", None, Duration::from_secs(5));
        assert!(matches!(err, Err(ServiceError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn list_sends_pagination_and_sort_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/articles"))
            .and(query_param("page", "2"))
            .and(query_param("page_size", "20"))
            .and(query_param("sort_by", "publishedAt"))
            .and(query_param("sort_order", "desc"))
            .and(query_param("category", "tech"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(3)))
            .expect(1)
            .mount(&server)
            .await;

        let page = service(&server.uri())
            .list_articles(Some("tech"), 2, 20, SortBy::PublishedAt, SortOrder::Desc)
            .await
            .unwrap();
        assert_eq!(page.articles.len(), 3);
    }

    #[tokio::test]
    async fn list_omits_category_when_unfiltered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .mount(&server)
            .await;

        let page = service(&server.uri())
            .list_articles(None, 1, 20, SortBy::default(), SortOrder::default())
            .await
            .unwrap();
        assert_eq!(page.total_pages, 0);

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].url.query().unwrap_or("").contains("category"));
    }

    #[tokio::test]
    async fn page_size_clamped_to_backend_bounds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/articles"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        service(&server.uri())
            .list_articles(None, 1, 500, SortBy::default(), SortOrder::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn search_sends_query_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/articles/search"))
            .and(query_param("q", "elon musk"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        service(&server.uri())
            .search_articles("elon musk", 1, 20)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_maps_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/articles"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = service(&server.uri())
            .list_articles(None, 1, 20, SortBy::default(), SortOrder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::HttpStatus(503)));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not json"))
            .mount(&server)
            .await;

        let err = service(&server.uri())
            .list_articles(None, 1, 20, SortBy::default(), SortOrder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/articles"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(EMPTY_PAGE)
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let svc = HttpArticleService::new(&server.uri(), None, Duration::from_millis(100)).unwrap();
        let err = svc
            .list_articles(None, 1, 20, SortBy::default(), SortOrder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
    }

    #[tokio::test]
    async fn api_key_sent_as_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/categories"))
            .and(header("X-API-Key", "secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": [{"name": "tech", "count": 12}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let svc =
            HttpArticleService::new(&server.uri(), Some("secret-key"), Duration::from_secs(5))
                .unwrap();
        let categories = svc.list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "tech");
        assert_eq!(categories[0].count, 12);
    }

    #[tokio::test]
    async fn set_saved_posts_exact_desired_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/article/a1/save"))
            .and(body_json(serde_json::json!({ "saved": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"id": "a1", "saved": true}
            })))
            .expect(1)
            .mount(&server)
            .await;

        service(&server.uri()).set_saved("a1", true).await.unwrap();
    }
}
