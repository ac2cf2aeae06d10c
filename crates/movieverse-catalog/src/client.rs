use async_trait::async_trait;
use movieverse_config::{resolve_api_key, ApiKey, CatalogConfig, Config, CredentialStore};
use movieverse_models::{Credits, Genre, GenreId, GenreList, MovieDetail, MovieId, MovieSummary, PageResult, VideoList};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

use crate::discover::{DiscoverFilters, DiscoverSort};
use crate::error::CatalogError;
use crate::images::{build_image_url, ImageKind, ImageSize};
use crate::request::CatalogRequest;
use crate::traits::Catalog;
use crate::transport::{ReqwestTransport, Transport, TransportError};

/// Authenticated TMDB client.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    image_base_url: String,
    api_key: ApiKey,
}

impl CatalogClient {
    pub fn new(api_key: ApiKey, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let transport = ReqwestTransport::new(config.timeout()).map_err(|e| CatalogError::Setup(e.to_string()))?;
        Ok(Self::with_transport(Arc::new(transport), api_key, config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, api_key: ApiKey, config: &CatalogConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Resolve the key and build a client, refusing to start without one.
    pub fn from_config(config: &Config, credentials: Option<&CredentialStore>) -> Result<Self, CatalogError> {
        let (api_key, source) = resolve_api_key(credentials)?;
        info!("Using TMDB API key {} from {}", api_key.masked(), source);
        Self::new(api_key, &config.catalog)
    }

    pub fn image_url(&self, path: Option<&str>, size: ImageSize, kind: ImageKind) -> Option<String> {
        build_image_url(&self.image_base_url, path, size, kind)
    }

    async fn send<T: DeserializeOwned>(&self, request: CatalogRequest) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, request.endpoint.path());
        debug!("GET {}", request.display_url(&self.base_url));

        let mut query = Vec::with_capacity(request.params.len() + 1);
        query.push(("api_key".to_string(), self.api_key.expose().to_string()));
        query.extend(request.params);

        let body = self.transport.get_json(&url, &query).await?;
        serde_json::from_value(body).map_err(|e| {
            CatalogError::from(TransportError::Decode {
                url,
                message: e.to_string(),
            })
        })
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn trending(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::trending(page)).await
    }

    async fn top_rated(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::top_rated(page)).await
    }

    async fn popular(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::popular(page)).await
    }

    async fn now_playing(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::now_playing(page)).await
    }

    async fn upcoming(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::upcoming(page)).await
    }

    async fn movie_details(&self, id: MovieId) -> Result<MovieDetail, CatalogError> {
        self.send(CatalogRequest::movie_details(id)).await
    }

    async fn movie_credits(&self, id: MovieId) -> Result<Credits, CatalogError> {
        self.send(CatalogRequest::movie_credits(id)).await
    }

    async fn movie_videos(&self, id: MovieId) -> Result<VideoList, CatalogError> {
        self.send(CatalogRequest::movie_videos(id)).await
    }

    async fn movie_recommendations(&self, id: MovieId, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::movie_recommendations(id, page)).await
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::search(query, page)).await
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let list: GenreList = self.send(CatalogRequest::genres()).await?;
        Ok(list.genres)
    }

    async fn movies_by_genre(
        &self,
        genre: GenreId,
        page: u32,
        sort: DiscoverSort,
    ) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::movies_by_genre(genre, page, sort)).await
    }

    async fn discover(&self, filters: &DiscoverFilters, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        self.send(CatalogRequest::discover(filters, page)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    const BASE: &str = "https://api.example/3";

    /// Records every call and replays one canned response.
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
        response: Mutex<Option<Result<serde_json::Value, u16>>>,
    }

    impl RecordingTransport {
        fn ok(body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                response: Mutex::new(Some(Ok(body))),
            })
        }

        fn status(code: u16) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                response: Mutex::new(Some(Err(code))),
            })
        }

        fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.calls.lock().unwrap().clone()
        }

        fn last_param(&self, key: &str) -> Option<String> {
            let calls = self.calls();
            let (_, query) = calls.last()?;
            query.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<serde_json::Value, TransportError> {
            self.calls.lock().unwrap().push((url.to_string(), query.to_vec()));
            match self.response.lock().unwrap().clone() {
                Some(Ok(body)) => Ok(body),
                Some(Err(status)) => Err(TransportError::Status {
                    status,
                    url: url.to_string(),
                    message: "scripted".to_string(),
                }),
                None => panic!("no scripted response"),
            }
        }
    }

    fn config() -> CatalogConfig {
        CatalogConfig {
            base_url: BASE.to_string(),
            ..CatalogConfig::default()
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> CatalogClient {
        CatalogClient::with_transport(transport, ApiKey::new("test-key").unwrap(), &config())
    }

    fn page_body() -> serde_json::Value {
        json!({
            "page": 1,
            "total_pages": 500,
            "total_results": 10000,
            "results": [
                {"id": 3, "title": "Gamma", "release_date": "2020-01-01", "vote_average": 7.1},
                {"id": 1, "title": "Alpha", "release_date": ""},
                {"id": 2, "title": "Beta", "vote_average": 5.0}
            ]
        })
    }

    #[tokio::test]
    async fn test_trending_request_shape() {
        let transport = RecordingTransport::ok(page_body());
        let page = client(transport.clone()).trending(2).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://api.example/3/trending/movie/week");
        assert_eq!(calls[0].1[0], ("api_key".to_string(), "test-key".to_string()));
        assert_eq!(transport.last_param("page").as_deref(), Some("2"));
        assert_eq!(page.total_pages, 500);
    }

    #[tokio::test]
    async fn test_results_keep_server_order() {
        let transport = RecordingTransport::ok(page_body());
        let page = client(transport).popular(1).await.unwrap();
        let ids: Vec<_> = page.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(page.results[1].release_date, None);
    }

    #[tokio::test]
    async fn test_list_endpoints_hit_expected_paths() {
        let transport = RecordingTransport::ok(page_body());
        let client = client(transport.clone());
        client.top_rated(1).await.unwrap();
        client.popular(1).await.unwrap();
        client.now_playing(1).await.unwrap();
        client.upcoming(1).await.unwrap();
        client.movie_recommendations(550, 1).await.unwrap();

        let urls: Vec<_> = transport.calls().into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.example/3/movie/top_rated",
                "https://api.example/3/movie/popular",
                "https://api.example/3/movie/now_playing",
                "https://api.example/3/movie/upcoming",
                "https://api.example/3/movie/550/recommendations",
            ]
        );
    }

    #[tokio::test]
    async fn test_search_params() {
        let transport = RecordingTransport::ok(page_body());
        client(transport.clone()).search_movies("matrix", 1).await.unwrap();
        assert_eq!(transport.calls()[0].0, "https://api.example/3/search/movie");
        assert_eq!(transport.last_param("query").as_deref(), Some("matrix"));
        assert_eq!(transport.last_param("page").as_deref(), Some("1"));
        assert_eq!(transport.last_param("api_key").as_deref(), Some("test-key"));
    }

    #[tokio::test]
    async fn test_movies_by_genre_params() {
        let transport = RecordingTransport::ok(page_body());
        client(transport.clone())
            .movies_by_genre(28, 3, DiscoverSort::VoteAverageDesc)
            .await
            .unwrap();
        assert_eq!(transport.calls()[0].0, "https://api.example/3/discover/movie");
        assert_eq!(transport.last_param("with_genres").as_deref(), Some("28"));
        assert_eq!(transport.last_param("page").as_deref(), Some("3"));
        assert_eq!(transport.last_param("sort_by").as_deref(), Some("vote_average.desc"));
    }

    #[tokio::test]
    async fn test_discover_passes_filters() {
        let transport = RecordingTransport::ok(page_body());
        let filters = DiscoverFilters::new().with_genres(&[18]).primary_release_year(1994);
        client(transport.clone()).discover(&filters, 1).await.unwrap();
        assert_eq!(transport.last_param("with_genres").as_deref(), Some("18"));
        assert_eq!(transport.last_param("primary_release_year").as_deref(), Some("1994"));
        assert_eq!(transport.last_param("page").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_movie_details_is_single_request() {
        let transport = RecordingTransport::ok(json!({
            "id": 550,
            "title": "Fight Club",
            "runtime": 139,
            "genres": [{"id": 18, "name": "Drama"}],
            "credits": {
                "cast": [{"id": 819, "name": "Edward Norton", "character": "The Narrator", "order": 0}],
                "crew": [{"id": 7467, "name": "David Fincher", "job": "Director", "department": "Directing"}]
            },
            "videos": {"results": [{"id": "v1", "key": "abc", "name": "Trailer", "site": "YouTube", "type": "Trailer"}]}
        }));
        let detail = client(transport.clone()).movie_details(550).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://api.example/3/movie/550");
        assert_eq!(transport.last_param("append_to_response").as_deref(), Some("videos,credits"));
        assert_eq!(detail.director(), Some("David Fincher"));
        assert!(detail.trailer().is_some());
    }

    #[tokio::test]
    async fn test_credits_and_videos_endpoints() {
        let transport = RecordingTransport::ok(json!({"id": 550, "cast": [], "crew": [], "results": []}));
        let client = client(transport.clone());
        client.movie_credits(550).await.unwrap();
        client.movie_videos(550).await.unwrap();
        let urls: Vec<_> = transport.calls().into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            urls,
            vec!["https://api.example/3/movie/550/credits", "https://api.example/3/movie/550/videos"]
        );
    }

    #[tokio::test]
    async fn test_genres_unwraps_envelope() {
        let transport = RecordingTransport::ok(json!({"genres": [{"id": 28, "name": "Action"}, {"id": 35, "name": "Comedy"}]}));
        let genres = client(transport.clone()).genres().await.unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[0].name, "Action");
        assert_eq!(transport.calls()[0].0, "https://api.example/3/genre/movie/list");
        assert_eq!(transport.last_param("page"), None);
    }

    #[tokio::test]
    async fn test_unauthorized_is_normalized_on_every_shape() {
        let client = client(RecordingTransport::status(401));
        let filters = DiscoverFilters::new();

        assert!(client.trending(1).await.unwrap_err().is_authentication());
        assert!(client.top_rated(1).await.unwrap_err().is_authentication());
        assert!(client.popular(1).await.unwrap_err().is_authentication());
        assert!(client.now_playing(1).await.unwrap_err().is_authentication());
        assert!(client.upcoming(1).await.unwrap_err().is_authentication());
        assert!(client.movie_details(1).await.unwrap_err().is_authentication());
        assert!(client.movie_credits(1).await.unwrap_err().is_authentication());
        assert!(client.movie_videos(1).await.unwrap_err().is_authentication());
        assert!(client.movie_recommendations(1, 1).await.unwrap_err().is_authentication());
        assert!(client.search_movies("matrix", 1).await.unwrap_err().is_authentication());
        assert!(client.genres().await.unwrap_err().is_authentication());
        assert!(client
            .movies_by_genre(28, 1, DiscoverSort::default())
            .await
            .unwrap_err()
            .is_authentication());
        assert!(client.discover(&filters, 1).await.unwrap_err().is_authentication());
    }

    #[tokio::test]
    async fn test_server_error_propagates_as_transport() {
        let err = client(RecordingTransport::status(500)).trending(1).await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(TransportError::Status { status: 500, .. })));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let err = client(RecordingTransport::ok(json!({"results": "not a list"})))
            .trending(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Transport(TransportError::Decode { .. })));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_image_url_uses_configured_base() {
        let client = client(RecordingTransport::ok(json!({})));
        assert_eq!(
            client.image_url(Some("/p.jpg"), ImageSize::Small, ImageKind::Poster),
            Some("https://image.tmdb.org/t/p/w154/p.jpg".to_string())
        );
        assert_eq!(client.image_url(None, ImageSize::Small, ImageKind::Poster), None);
    }
}
