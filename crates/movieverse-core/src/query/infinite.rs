use movieverse_catalog::{Catalog, CatalogError, DiscoverSort};
use movieverse_models::{GenreId, MovieSummary, PageResult};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::error::QueryError;
use super::key::{genre_enabled, search_enabled};
use super::retry::RetryPolicy;

/// Which list an infinite query accumulates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InfiniteShape {
    Trending,
    Search(String),
    ByGenre { genre: GenreId, sort: DiscoverSort },
}

impl InfiniteShape {
    /// Search text is trimmed so "  dune" and "dune" share one accumulation.
    pub fn search(query: &str) -> Self {
        InfiniteShape::Search(query.trim().to_string())
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            InfiniteShape::Trending => true,
            InfiniteShape::Search(query) => search_enabled(query),
            InfiniteShape::ByGenre { genre, .. } => genre_enabled(Some(*genre)),
        }
    }

    async fn fetch<C: Catalog + ?Sized>(&self, catalog: &C, page: u32) -> Result<PageResult<MovieSummary>, CatalogError> {
        match self {
            InfiniteShape::Trending => catalog.trending(page).await,
            InfiniteShape::Search(query) => catalog.search_movies(query, page).await,
            InfiniteShape::ByGenre { genre, sort } => catalog.movies_by_genre(*genre, page, *sort).await,
        }
    }
}

impl fmt::Display for InfiniteShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfiniteShape::Trending => write!(f, "trending"),
            InfiniteShape::Search(query) => write!(f, "search[{:?}]", query),
            InfiniteShape::ByGenre { genre, sort } => write!(f, "by_genre[{}, sort={}]", genre, sort),
        }
    }
}

/// Result of asking for another page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// The page was fetched and appended.
    Fetched(u32),
    /// Another fetch is still outstanding; nothing was requested.
    InFlight,
    /// The last fetched page was the final one.
    Exhausted,
    /// `load` found pages already accumulated.
    AlreadyLoaded,
    /// The shape's inputs are not valid yet (no genre, short search text).
    Disabled,
    /// `reset` ran while the page was in flight, so it was dropped.
    Discarded,
}

/// Pages of one list appended in fetch order.
///
/// At most one fetch runs at a time. A call that arrives while one is
/// outstanding returns [`NextPage::InFlight`] instead of queueing.
pub struct InfiniteQuery<C: ?Sized> {
    shape: InfiniteShape,
    catalog: Arc<C>,
    retry: RetryPolicy,
    pages: Mutex<Vec<Arc<PageResult<MovieSummary>>>>,
    fetching: AtomicBool,
    generation: AtomicU64,
}

/// Clears the in-flight flag even if the fetching future is dropped.
struct FetchGuard<'a>(&'a AtomicBool);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<C: Catalog + ?Sized> InfiniteQuery<C> {
    pub fn new(shape: InfiniteShape, catalog: Arc<C>, retry: RetryPolicy) -> Self {
        Self {
            shape,
            catalog,
            retry,
            pages: Mutex::new(Vec::new()),
            fetching: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn shape(&self) -> &InfiniteShape {
        &self.shape
    }

    pub fn is_enabled(&self) -> bool {
        self.shape.is_enabled()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// Fetch the first page unless one is already loaded.
    pub async fn load(&self) -> Result<NextPage, QueryError> {
        if !self.lock().is_empty() {
            return Ok(NextPage::AlreadyLoaded);
        }
        self.fetch_next_page().await
    }

    /// Append the page after the last one fetched (page 1 when empty).
    pub async fn fetch_next_page(&self) -> Result<NextPage, QueryError> {
        if !self.is_enabled() {
            return Ok(NextPage::Disabled);
        }
        if self
            .fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("{}: fetch already in flight, skipping", self.shape);
            return Ok(NextPage::InFlight);
        }
        let _guard = FetchGuard(&self.fetching);

        let (page, generation) = {
            let pages = self.lock();
            let generation = self.generation.load(Ordering::Acquire);
            match pages.last() {
                None => (1, generation),
                Some(last) => match last.next_page() {
                    Some(next) => (next, generation),
                    None => return Ok(NextPage::Exhausted),
                },
            }
        };

        debug!("{}: fetching page {}", self.shape, page);
        let label = format!("{} page {}", self.shape, page);
        let shape = &self.shape;
        let catalog = self.catalog.as_ref();
        let result = self.retry.run(&label, || shape.fetch(catalog, page)).await?;

        let fetched = result.page;
        let mut pages = self.lock();
        if self.generation.load(Ordering::Acquire) != generation {
            debug!("{}: reset during fetch, dropping page {}", self.shape, fetched);
            return Ok(NextPage::Discarded);
        }
        pages.push(Arc::new(result));
        Ok(NextPage::Fetched(fetched))
    }

    /// `last.page < last.total_pages`; false before anything is loaded.
    pub fn has_next_page(&self) -> bool {
        self.lock().last().is_some_and(|last| last.has_next_page())
    }

    pub fn pages(&self) -> Vec<Arc<PageResult<MovieSummary>>> {
        self.lock().clone()
    }

    pub fn page_count(&self) -> usize {
        self.lock().len()
    }

    /// Every result of every page, in page order.
    pub fn results(&self) -> Vec<MovieSummary> {
        self.lock()
            .iter()
            .flat_map(|page| page.results.iter().cloned())
            .collect()
    }

    /// Forget all pages; the next fetch starts again at page 1.
    /// A fetch still in flight is discarded when it completes.
    pub fn reset(&self) {
        let mut pages = self.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        pages.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<PageResult<MovieSummary>>>> {
        self.pages.lock().unwrap_or_else(|e| e.into_inner())
    }
}
