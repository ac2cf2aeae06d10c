use movieverse_catalog::{Catalog, CatalogError, DiscoverFilters, DiscoverSort};
use movieverse_config::{CacheConfig, Config};
use movieverse_models::{Credits, Genre, GenreId, MovieDetail, MovieId, MovieSummary, PageResult, VideoList};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::cache::QueryCache;
use super::error::QueryError;
use super::infinite::{InfiniteQuery, InfiniteShape};
use super::key::{genre_enabled, movie_enabled, search_enabled, QueryKey};
use super::retry::RetryPolicy;

pub type MoviePage = Arc<PageResult<MovieSummary>>;

/// A query that either ran or was never started because its inputs were
/// missing. `Disabled` is a normal state, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    Disabled,
    Ready(T),
}

impl<T> QueryOutcome<T> {
    pub fn is_disabled(&self) -> bool {
        matches!(self, QueryOutcome::Disabled)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            QueryOutcome::Ready(value) => Some(value),
            QueryOutcome::Disabled => None,
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            QueryOutcome::Ready(value) => Some(value),
            QueryOutcome::Disabled => None,
        }
    }
}

/// Every catalog read the application makes, behind caching, request
/// coalescing, retries and input preconditions.
pub struct MovieQueries<C: ?Sized> {
    catalog: Arc<C>,
    windows: CacheConfig,
    retry: RetryPolicy,
    pages: QueryCache<MoviePage>,
    details: QueryCache<Arc<MovieDetail>>,
    credits: QueryCache<Arc<Credits>>,
    videos: QueryCache<Arc<VideoList>>,
    genres: QueryCache<Arc<Vec<Genre>>>,
    infinite: Mutex<HashMap<InfiniteShape, Arc<InfiniteQuery<C>>>>,
}

impl<C: Catalog + ?Sized + 'static> MovieQueries<C> {
    pub fn new(catalog: Arc<C>, windows: CacheConfig, retry: RetryPolicy) -> Self {
        let gc_after = windows.gc();
        Self {
            catalog,
            windows,
            retry,
            pages: QueryCache::new(gc_after),
            details: QueryCache::new(gc_after),
            credits: QueryCache::new(gc_after),
            videos: QueryCache::new(gc_after),
            genres: QueryCache::new(gc_after),
            infinite: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(catalog: Arc<C>, config: &Config) -> Self {
        Self::new(catalog, config.cache.clone(), RetryPolicy::from(&config.retry))
    }

    pub async fn trending(&self, page: u32) -> Result<MoviePage, QueryError> {
        let page = page.max(1);
        self.page(QueryKey::Trending { page }, move |catalog| async move { catalog.trending(page).await })
            .await
    }

    pub async fn top_rated(&self, page: u32) -> Result<MoviePage, QueryError> {
        let page = page.max(1);
        self.page(QueryKey::TopRated { page }, move |catalog| async move { catalog.top_rated(page).await })
            .await
    }

    pub async fn popular(&self, page: u32) -> Result<MoviePage, QueryError> {
        let page = page.max(1);
        self.page(QueryKey::Popular { page }, move |catalog| async move { catalog.popular(page).await })
            .await
    }

    pub async fn now_playing(&self, page: u32) -> Result<MoviePage, QueryError> {
        let page = page.max(1);
        self.page(QueryKey::NowPlaying { page }, move |catalog| async move { catalog.now_playing(page).await })
            .await
    }

    pub async fn upcoming(&self, page: u32) -> Result<MoviePage, QueryError> {
        let page = page.max(1);
        self.page(QueryKey::Upcoming { page }, move |catalog| async move { catalog.upcoming(page).await })
            .await
    }

    pub async fn discover(&self, filters: &DiscoverFilters, page: u32) -> Result<MoviePage, QueryError> {
        let page = page.max(1);
        let key = QueryKey::Discover {
            filters: filters.clone(),
            page,
        };
        let filters = filters.clone();
        self.page(key, move |catalog| {
            let filters = filters.clone();
            async move { catalog.discover(&filters, page).await }
        })
        .await
    }

    /// Disabled for text shorter than three characters once trimmed.
    pub async fn search(&self, query: &str, page: u32) -> Result<QueryOutcome<MoviePage>, QueryError> {
        if !search_enabled(query) {
            debug!("Search disabled for {:?}", query);
            return Ok(QueryOutcome::Disabled);
        }
        let query = query.trim().to_string();
        let page = page.max(1);
        let key = QueryKey::Search {
            query: query.clone(),
            page,
        };
        self.page(key, move |catalog| {
            let query = query.clone();
            async move { catalog.search_movies(&query, page).await }
        })
        .await
        .map(QueryOutcome::Ready)
    }

    pub async fn movies_by_genre(
        &self,
        genre: Option<GenreId>,
        page: u32,
        sort: DiscoverSort,
    ) -> Result<QueryOutcome<MoviePage>, QueryError> {
        let genre = match genre {
            Some(genre) if genre_enabled(Some(genre)) => genre,
            _ => return Ok(QueryOutcome::Disabled),
        };
        let page = page.max(1);
        self.page(QueryKey::ByGenre { genre, page, sort }, move |catalog| async move {
            catalog.movies_by_genre(genre, page, sort).await
        })
        .await
        .map(QueryOutcome::Ready)
    }

    pub async fn recommendations(&self, id: Option<MovieId>, page: u32) -> Result<QueryOutcome<MoviePage>, QueryError> {
        let id = match id {
            Some(id) if movie_enabled(Some(id)) => id,
            _ => return Ok(QueryOutcome::Disabled),
        };
        let page = page.max(1);
        self.page(QueryKey::Recommendations { id, page }, move |catalog| async move {
            catalog.movie_recommendations(id, page).await
        })
        .await
        .map(QueryOutcome::Ready)
    }

    pub async fn movie_details(&self, id: Option<MovieId>) -> Result<QueryOutcome<Arc<MovieDetail>>, QueryError> {
        let id = match id {
            Some(id) if movie_enabled(Some(id)) => id,
            _ => return Ok(QueryOutcome::Disabled),
        };
        let key = QueryKey::MovieDetails { id };
        let stale_after = key.stale_after(&self.windows);
        let fetch = self.fetcher(key.to_string(), move |catalog| async move { catalog.movie_details(id).await });
        self.details.get(key, stale_after, fetch).await.map(QueryOutcome::Ready)
    }

    pub async fn movie_credits(&self, id: Option<MovieId>) -> Result<QueryOutcome<Arc<Credits>>, QueryError> {
        let id = match id {
            Some(id) if movie_enabled(Some(id)) => id,
            _ => return Ok(QueryOutcome::Disabled),
        };
        let key = QueryKey::MovieCredits { id };
        let stale_after = key.stale_after(&self.windows);
        let fetch = self.fetcher(key.to_string(), move |catalog| async move { catalog.movie_credits(id).await });
        self.credits.get(key, stale_after, fetch).await.map(QueryOutcome::Ready)
    }

    pub async fn movie_videos(&self, id: Option<MovieId>) -> Result<QueryOutcome<Arc<VideoList>>, QueryError> {
        let id = match id {
            Some(id) if movie_enabled(Some(id)) => id,
            _ => return Ok(QueryOutcome::Disabled),
        };
        let key = QueryKey::MovieVideos { id };
        let stale_after = key.stale_after(&self.windows);
        let fetch = self.fetcher(key.to_string(), move |catalog| async move { catalog.movie_videos(id).await });
        self.videos.get(key, stale_after, fetch).await.map(QueryOutcome::Ready)
    }

    pub async fn genres(&self) -> Result<Arc<Vec<Genre>>, QueryError> {
        let key = QueryKey::Genres;
        let stale_after = key.stale_after(&self.windows);
        let fetch = self.fetcher(key.to_string(), |catalog| async move { catalog.genres().await });
        self.genres.get(key, stale_after, fetch).await
    }

    /// The accumulation for `shape`, created on first use and reused after.
    /// Disabled shapes get a throwaway query that is never registered.
    pub fn infinite(&self, shape: InfiniteShape) -> Arc<InfiniteQuery<C>> {
        if !shape.is_enabled() {
            return Arc::new(InfiniteQuery::new(shape, Arc::clone(&self.catalog), self.retry));
        }
        let mut registry = self.infinite.lock().unwrap_or_else(|e| e.into_inner());
        registry
            .entry(shape)
            .or_insert_with_key(|shape| Arc::new(InfiniteQuery::new(shape.clone(), Arc::clone(&self.catalog), self.retry)))
            .clone()
    }

    /// Drop one cached list or detail so the next access refetches it.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match key {
            QueryKey::MovieDetails { .. } => self.details.invalidate(key),
            QueryKey::MovieCredits { .. } => self.credits.invalidate(key),
            QueryKey::MovieVideos { .. } => self.videos.invalidate(key),
            QueryKey::Genres => self.genres.invalidate(key),
            _ => self.pages.invalidate(key),
        }
    }

    /// Forget every cached result and accumulated page.
    pub fn clear(&self) {
        self.pages.clear();
        self.details.clear();
        self.credits.clear();
        self.videos.clear();
        self.genres.clear();
        self.infinite.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    async fn page<F, Fut>(&self, key: QueryKey, call: F) -> Result<MoviePage, QueryError>
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageResult<MovieSummary>, CatalogError>> + Send + 'static,
    {
        let stale_after = key.stale_after(&self.windows);
        let fetch = self.fetcher(key.to_string(), call);
        self.pages.get(key, stale_after, fetch).await
    }

    /// Wrap one catalog call with retries, producing the shared value type.
    fn fetcher<T, F, Fut>(
        &self,
        label: String,
        call: F,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<Arc<T>, QueryError>> + Send>>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CatalogError>> + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        let retry = self.retry;
        move || {
            Box::pin(async move {
                retry
                    .run(&label, || call(Arc::clone(&catalog)))
                    .await
                    .map(Arc::new)
                    .map_err(QueryError::from)
            })
        }
    }
}
