use async_trait::async_trait;
use movieverse_models::{Credits, Genre, GenreId, MovieDetail, MovieId, MovieSummary, PageResult, VideoList};

use crate::discover::{DiscoverFilters, DiscoverSort};
use crate::error::CatalogError;

/// Read-only access to the movie catalog.
///
/// Pages are 1-based. Results come back in server order.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn trending(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;

    async fn top_rated(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;

    async fn popular(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;

    async fn now_playing(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;

    async fn upcoming(&self, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;

    /// Detail with credits and videos embedded.
    async fn movie_details(&self, id: MovieId) -> Result<MovieDetail, CatalogError>;

    async fn movie_credits(&self, id: MovieId) -> Result<Credits, CatalogError>;

    async fn movie_videos(&self, id: MovieId) -> Result<VideoList, CatalogError>;

    async fn movie_recommendations(&self, id: MovieId, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;

    async fn search_movies(&self, query: &str, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError>;

    async fn movies_by_genre(
        &self,
        genre: GenreId,
        page: u32,
        sort: DiscoverSort,
    ) -> Result<PageResult<MovieSummary>, CatalogError>;

    async fn discover(&self, filters: &DiscoverFilters, page: u32) -> Result<PageResult<MovieSummary>, CatalogError>;
}
