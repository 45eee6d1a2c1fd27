//! `TmdbClient` - TMDB API client implementation.

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::instrument;
use url::Url;

use super::api::{MediaApi, TRENDING_LIMIT};
use super::error::{ApiError, NetworkFailure};
use super::kind::MediaKind;
use super::query::{Endpoint, MediaQuery};
use super::types::{
    MediaDetail, MediaItem, MovieDetail, MovieSummary, Paged, TmdbErrorResponse, TvDetail,
    TvSummary,
};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "en-US";

/// TMDB API client.
///
/// The bearer token is fixed at build time and never changes for the
/// lifetime of the client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer API token.
    api_token: String,
    /// Response language sent with every request.
    language: String,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            user_agent: None,
            language: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API bearer token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the response language (default: "en-US").
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_token` is not set or empty.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_token = self
            .api_token
            .filter(|t| !t.trim().is_empty())
            .context("api_token is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_token,
            language: self
                .language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends a GET request with Bearer auth and JSON accept header.
    ///
    /// No retries: a non-success status is returned as [`ApiError::Request`]
    /// straight away.
    #[instrument(skip_all, fields(path = %endpoint.path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<T, ApiError> {
        let path = endpoint.path.as_str();
        let url = self
            .base_url
            .join(path)
            .map_err(|source| ApiError::InvalidPath {
                path: String::from(path),
                source,
            })?;

        let network = |source: NetworkFailure| ApiError::Network {
            path: String::from(path),
            source,
        };

        let request = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_token)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .query(&[("language", self.language.as_str())])
            .query(&endpoint.params)
            .build()
            .map_err(|e| network(e.into()))?;

        tracing::debug!(url = %request.url(), "TMDB API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| network(e.into()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| network(e.into()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<TmdbErrorResponse>(&body)
                .ok()
                .map(|e| e.status_message);
            tracing::warn!(status = status.as_u16(), path, "TMDB API request failed");
            return Err(ApiError::Request {
                path: String::from(path),
                status: status.as_u16(),
                status_text: String::from(status.canonical_reason().unwrap_or_default()),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| network(e.into()))
    }

    /// Fetches a list endpoint and tags every result with `kind`.
    async fn get_items(
        &self,
        kind: MediaKind,
        endpoint: &Endpoint,
    ) -> Result<Vec<MediaItem>, ApiError> {
        let items = match kind {
            MediaKind::Movie => self
                .get_json::<Paged<MovieSummary>>(endpoint)
                .await?
                .results
                .into_iter()
                .map(MediaItem::Movie)
                .collect(),
            MediaKind::Tv => self
                .get_json::<Paged<TvSummary>>(endpoint)
                .await?
                .results
                .into_iter()
                .map(MediaItem::Tv)
                .collect(),
        };
        Ok(items)
    }
}

impl MediaApi for TmdbClient {
    #[instrument(skip_all, fields(kind = %kind))]
    async fn search_or_discover(
        &self,
        kind: MediaKind,
        query: &MediaQuery,
    ) -> Result<Vec<MediaItem>, ApiError> {
        let endpoint = query.endpoint(kind);
        self.get_items(kind, &endpoint).await
    }

    #[instrument(skip_all, fields(kind = %kind))]
    async fn trending(&self, kind: MediaKind) -> Result<Vec<MediaItem>, ApiError> {
        let endpoint = Endpoint {
            path: format!("trending/{}/week", kind.path_segment()),
            params: Vec::new(),
        };
        let mut items = self.get_items(kind, &endpoint).await?;
        items.truncate(TRENDING_LIMIT);
        Ok(items)
    }

    #[instrument(skip_all, fields(kind = %kind, id = id))]
    async fn detail(&self, kind: MediaKind, id: u64) -> Result<MediaDetail, ApiError> {
        let endpoint = Endpoint {
            path: format!("{}/{id}", kind.path_segment()),
            params: Vec::new(),
        };
        let detail = match kind {
            MediaKind::Movie => MediaDetail::Movie(self.get_json::<MovieDetail>(&endpoint).await?),
            MediaKind::Tv => MediaDetail::Tv(self.get_json::<TvDetail>(&endpoint).await?),
        };
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]
    #![allow(clippy::panic)]

    use super::*;

    /// Builds a client pointed at the mock server's `/3/` prefix.
    fn mock_client(server: &wiremock::MockServer, token: &str) -> TmdbClient {
        let base_url = format!("{}/3/", server.uri());
        TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_token(token)
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    /// A trending payload with `count` sequentially numbered movies.
    fn trending_body(count: u64) -> serde_json::Value {
        let results: Vec<serde_json::Value> = (1..=count)
            .map(|i| serde_json::json!({ "id": i, "title": format!("Movie {i}") }))
            .collect();
        serde_json::json!({
            "page": 1,
            "results": results,
            "total_pages": 1,
            "total_results": count,
        })
    }

    #[test]
    fn test_builder_requires_api_token() {
        // Arrange & Act
        let result = TmdbClient::builder().user_agent("test/0.0.0").build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("api_token is required")
        );
    }

    #[test]
    fn test_builder_rejects_blank_api_token() {
        // Arrange & Act
        let result = TmdbClient::builder()
            .api_token("  ")
            .user_agent("test/0.0.0")
            .build();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_user_agent() {
        // Arrange & Act
        let result = TmdbClient::builder().api_token("test-token").build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("user_agent is required")
        );
    }

    #[test]
    fn test_builder_with_custom_base_url() {
        // Arrange
        let custom_url = Url::parse("http://localhost:8080/3/").unwrap();

        // Act
        let client = TmdbClient::builder()
            .base_url(custom_url.clone())
            .api_token("test-token")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url(), &custom_url);
        assert_eq!(client.language, "en-US");
    }

    #[tokio::test]
    async fn test_query_issues_search_request() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/search_movie_inception.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/search/movie"))
            .and(wiremock::matchers::query_param("query", "Inception"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;
        wiremock::Mock::given(wiremock::matchers::path("/3/discover/movie"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let items = client
            .search_or_discover(MediaKind::Movie, &MediaQuery::search("Inception"))
            .await
            .unwrap();

        // Assert
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id(), 27_205);
        assert_eq!(items[0].title(), "Inception");
    }

    #[tokio::test]
    async fn test_genre_issues_discover_request() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/discover_tv.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/discover/tv"))
            .and(wiremock::matchers::query_param("sort_by", "popularity.desc"))
            .and(wiremock::matchers::query_param("with_genres", "18"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let items = client
            .search_or_discover(MediaKind::Tv, &MediaQuery::genre(18))
            .await
            .unwrap();

        // Assert
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind(), MediaKind::Tv);
        assert_eq!(items[0].title(), "Breaking Bad");
    }

    #[tokio::test]
    async fn test_popular_issues_unfiltered_discover_request() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/discover_movie.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/discover/movie"))
            .and(wiremock::matchers::query_param("sort_by", "popularity.desc"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let items = client
            .search_or_discover(MediaKind::Movie, &MediaQuery::popular())
            .await
            .unwrap();

        // Assert
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].title(), "The Godfather");
    }

    #[tokio::test]
    async fn test_trending_truncates_to_ten_in_order() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/trending/movie/week"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(trending_body(25)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let items = client.trending(MediaKind::Movie).await.unwrap();

        // Assert
        assert_eq!(items.len(), TRENDING_LIMIT);
        let ids: Vec<u64> = items.iter().map(MediaItem::id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_trending_keeps_short_lists() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/3/trending/movie/week"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(trending_body(4)))
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let items = client.trending(MediaKind::Movie).await.unwrap();

        // Assert
        assert_eq!(items.len(), 4);
    }

    #[tokio::test]
    async fn test_movie_detail_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/movie_550.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/movie/550"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let detail = client.detail(MediaKind::Movie, 550).await.unwrap();

        // Assert
        assert_eq!(detail.kind(), MediaKind::Movie);
        assert_eq!(detail.title(), "Fight Club");
        assert_eq!(detail.runtime(), Some(139));
    }

    #[tokio::test]
    async fn test_tv_detail_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/tv_1396.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/tv/1396"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let detail = client.detail(MediaKind::Tv, 1396).await.unwrap();

        // Assert
        let MediaDetail::Tv(tv) = detail else {
            panic!("expected TV detail");
        };
        assert_eq!(tv.number_of_seasons, 5);
    }

    #[tokio::test]
    async fn test_bearer_and_accept_headers_are_sent() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/tmdb/discover_movie.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::header(
                "Authorization",
                "Bearer my-secret-token",
            ))
            .and(wiremock::matchers::header("Accept", "application/json"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "my-secret-token");

        // Act & Assert (mock expect(1) verifies the headers)
        client
            .search_or_discover(MediaKind::Movie, &MediaQuery::popular())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_error_returns_request_error_with_status_text() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let error_body = r#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404).set_body_string(error_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let err = client.detail(MediaKind::Movie, 999_999).await.unwrap_err();

        // Assert
        assert!(err.is_request());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.status_text(), Some("Not Found"));
        assert!(err.to_string().contains("could not be found"));
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let err = client.trending(MediaKind::Tv).await.unwrap_err();

        // Assert
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.status_text(), Some("Too Many Requests"));
    }

    #[tokio::test]
    async fn test_malformed_body_returns_network_error() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server, "test-token");

        // Act
        let err = client.trending(MediaKind::Movie).await.unwrap_err();

        // Assert
        assert!(err.is_network());
        assert!(err.to_string().contains("malformed response body"));
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_network_error() {
        // Arrange
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = TmdbClient::builder()
            .base_url(format!("http://{addr}/3/").parse().unwrap())
            .api_token("test-token")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let err = client.detail(MediaKind::Tv, 1).await.unwrap_err();

        // Assert
        assert!(err.is_network());
        assert_eq!(err.status(), None);
    }
}
