use movieverse_models::{GenreId, MovieId};

use crate::discover::{DiscoverFilters, DiscoverSort};
use crate::endpoints::Endpoint;

/// Reserved parameters that callers may never set through filters.
const RESERVED_PARAMS: [&str; 2] = ["api_key", "page"];

/// A typed catalog intent turned into a path plus query parameters.
/// The API key is added by the client at send time and never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
}

impl CatalogRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Pages are 1-based; 0 is treated as the first page.
    pub fn page(self, page: u32) -> Self {
        self.param("page", page.max(1))
    }

    pub fn trending(page: u32) -> Self {
        Self::new(Endpoint::Trending).page(page)
    }

    pub fn top_rated(page: u32) -> Self {
        Self::new(Endpoint::TopRated).page(page)
    }

    pub fn popular(page: u32) -> Self {
        Self::new(Endpoint::Popular).page(page)
    }

    pub fn now_playing(page: u32) -> Self {
        Self::new(Endpoint::NowPlaying).page(page)
    }

    pub fn upcoming(page: u32) -> Self {
        Self::new(Endpoint::Upcoming).page(page)
    }

    /// Detail, credits and videos in a single round trip.
    pub fn movie_details(id: MovieId) -> Self {
        Self::new(Endpoint::MovieDetails(id)).param("append_to_response", "videos,credits")
    }

    pub fn movie_credits(id: MovieId) -> Self {
        Self::new(Endpoint::MovieCredits(id))
    }

    pub fn movie_videos(id: MovieId) -> Self {
        Self::new(Endpoint::MovieVideos(id))
    }

    pub fn movie_recommendations(id: MovieId, page: u32) -> Self {
        Self::new(Endpoint::MovieRecommendations(id)).page(page)
    }

    pub fn search(query: &str, page: u32) -> Self {
        Self::new(Endpoint::SearchMovies).param("query", query).page(page)
    }

    pub fn genres() -> Self {
        Self::new(Endpoint::Genres)
    }

    pub fn movies_by_genre(genre: GenreId, page: u32, sort: DiscoverSort) -> Self {
        Self::new(Endpoint::Discover)
            .param("with_genres", genre)
            .page(page)
            .param("sort_by", sort.as_str())
    }

    /// Filters first, then the page, which always wins over a filter of the same name.
    pub fn discover(filters: &DiscoverFilters, page: u32) -> Self {
        let mut request = Self::new(Endpoint::Discover);
        for (key, value) in filters.iter() {
            if RESERVED_PARAMS.contains(&key) {
                continue;
            }
            request = request.param(key, value);
        }
        request.page(page)
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Full URL for logs; safe to print because the key is not part of it.
    pub fn display_url(&self, base_url: &str) -> String {
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            format!("{}{}", base_url, self.endpoint.path())
        } else {
            format!("{}{}?{}", base_url, self.endpoint.path(), query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamps() {
        assert_eq!(CatalogRequest::trending(0).get_param("page"), Some("1"));
        assert_eq!(CatalogRequest::popular(3).get_param("page"), Some("3"));
    }

    #[test]
    fn test_discover_page_overrides_filter() {
        let filters = DiscoverFilters::new()
            .set("page", 9)
            .set("api_key", "sneaky")
            .with_genres(&[35]);
        let request = CatalogRequest::discover(&filters, 2);
        assert_eq!(request.get_param("page"), Some("2"));
        assert_eq!(request.get_param("with_genres"), Some("35"));
        assert_eq!(request.get_param("api_key"), None);
        assert_eq!(request.params.iter().filter(|(k, _)| k == "page").count(), 1);
    }

    #[test]
    fn test_display_url_encodes_query() {
        let request = CatalogRequest::search("the matrix & co", 1);
        assert_eq!(
            request.display_url("https://api.example/3"),
            "https://api.example/3/search/movie?query=the%20matrix%20%26%20co&page=1"
        );
        assert_eq!(
            CatalogRequest::genres().display_url("https://api.example/3"),
            "https://api.example/3/genre/movie/list"
        );
    }
}
