use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::models::ErrorBody;
use super::{ApiError, Backend, NewReview, Review, SearchResult};

/// Backend reached over HTTP, rooted at a base URL such as `http://localhost:3000`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Backend URL cannot carry a path: {}", base_url);
        }

        let client = Client::builder()
            .user_agent(concat!("reelnote/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Turn a non-success response into an error, keeping the backend's message
    async fn status_error(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.bytes().await {
            Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error),
            Err(_) => None,
        };
        tracing::warn!(status, message = ?message, "Backend rejected request");
        ApiError::Status { status, message }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn search(&self, keyword: &str, page: u32) -> Result<SearchResult, ApiError> {
        let mut url = self.endpoint(&["api", "search"]);
        url.query_pairs_mut()
            .append_pair("q", keyword)
            .append_pair("page", &page.to_string());

        tracing::debug!(%url, "GET search");
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn fetch_reviews(&self, title: &str) -> Result<Vec<Review>, ApiError> {
        let url = self.endpoint(&["api", "reviews", title]);

        tracing::debug!(%url, "GET reviews");
        let response = self.client.get(url).send().await?;
        let mut reviews: Vec<Review> = Self::read_json(response).await?;
        for review in &mut reviews {
            if review.movie_title.is_empty() {
                review.movie_title = title.to_string();
            }
        }
        Ok(reviews)
    }

    async fn create_review(&self, review: &NewReview) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "reviews"]);

        tracing::debug!(%url, title = %review.movie_title, "POST review");
        let response = self.client.post(url).json(review).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(())
    }

    async fn delete_review(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "reviews", &id.to_string()]);

        tracing::debug!(%url, "DELETE review");
        let response = self.client.delete(url).send().await?;
        if response.status() != StatusCode::NO_CONTENT {
            return Err(Self::status_error(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = HttpBackend::new("http://example.com/proxy/").unwrap();
        let url = backend.endpoint(&["api", "reviews", "AC/DC: Live"]);
        assert_eq!(url.as_str(), "http://example.com/proxy/api/reviews/AC%2FDC:%20Live");

        let backend = HttpBackend::new("http://example.com").unwrap();
        assert_eq!(backend.endpoint(&["api", "search"]).path(), "/api/search");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(HttpBackend::new("not a url").is_err());
        assert!(HttpBackend::new("mailto:someone@example.com").is_err());
    }

    #[tokio::test]
    async fn test_search_sends_keyword_and_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("q", "star wars"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {
                        "imdbID": "tt0076759",
                        "Title": "Star Wars",
                        "Year": "1977",
                        "Poster": "http://img/sw.jpg"
                    }
                ],
                "totalResults": 42
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).unwrap();
        let result = backend.search("star wars", 2).await.unwrap();

        assert_eq!(result.total_count, 42);
        assert_eq!(result.items[0].title, "Star Wars");
        assert_eq!(result.items[0].poster_url, "http://img/sw.jpg");
    }

    #[tokio::test]
    async fn test_search_error_field_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Movie not found!"})),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).unwrap();
        let err = backend.search("zzzzqx", 1).await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        assert_eq!(err.backend_message(), Some("Movie not found!"));
    }

    #[tokio::test]
    async fn test_search_error_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).unwrap();
        let err = backend.search("batman", 1).await.unwrap_err();
        assert_eq!(err.backend_message(), None);
    }

    #[tokio::test]
    async fn test_search_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).unwrap();
        let err = backend.search("batman", 1).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_reviews_encodes_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reviews/The%20Dark%20Knight"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "reviewText": "Why so serious"},
                {"id": 7, "reviewText": "Ledger!"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).unwrap();
        let reviews = backend.fetch_reviews("The Dark Knight").await.unwrap();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].id, 3);
        assert_eq!(reviews[1].text, "Ledger!");
        assert!(reviews.iter().all(|r| r.movie_title == "The Dark Knight"));
    }

    #[tokio::test]
    async fn test_create_review_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reviews"))
            .and(body_json(json!({"movieTitle": "Batman", "reviewText": "Great film"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).unwrap();
        backend
            .create_review(&NewReview {
                movie_title: "Batman".to_string(),
                review_text: "Great film".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_requires_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/reviews/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/reviews/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).unwrap();
        assert!(backend.delete_review(1).await.is_ok());

        let err = backend.delete_review(2).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Nothing listens on port 9 locally
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        let err = backend.fetch_reviews("Batman").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
