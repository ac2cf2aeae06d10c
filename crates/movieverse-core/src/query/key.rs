use movieverse_catalog::{DiscoverFilters, DiscoverSort};
use movieverse_config::CacheConfig;
use movieverse_models::{GenreId, MovieId};
use std::fmt;
use std::time::Duration;

/// Shortest search text (after trimming) that is sent to the catalog.
pub const MIN_SEARCH_CHARS: usize = 3;

/// Full parameter tuple of a cached query. Two requests share a cache entry
/// exactly when their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Trending { page: u32 },
    TopRated { page: u32 },
    Popular { page: u32 },
    NowPlaying { page: u32 },
    Upcoming { page: u32 },
    MovieDetails { id: MovieId },
    MovieCredits { id: MovieId },
    MovieVideos { id: MovieId },
    Recommendations { id: MovieId, page: u32 },
    Search { query: String, page: u32 },
    Genres,
    ByGenre { genre: GenreId, page: u32, sort: DiscoverSort },
    Discover { filters: DiscoverFilters, page: u32 },
}

/// Queries grouped by how quickly their results go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFamily {
    Search,
    List,
    Detail,
    Genre,
}

impl QueryKey {
    pub fn family(&self) -> QueryFamily {
        match self {
            QueryKey::Search { .. } => QueryFamily::Search,
            QueryKey::MovieDetails { .. } | QueryKey::MovieCredits { .. } | QueryKey::MovieVideos { .. } => {
                QueryFamily::Detail
            }
            QueryKey::Genres => QueryFamily::Genre,
            _ => QueryFamily::List,
        }
    }

    pub fn stale_after(&self, windows: &CacheConfig) -> Duration {
        match self.family() {
            QueryFamily::Search => windows.search_stale(),
            QueryFamily::List => windows.list_stale(),
            QueryFamily::Detail => windows.detail_stale(),
            QueryFamily::Genre => windows.genre_stale(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Trending { page } => write!(f, "trending[page={}]", page),
            QueryKey::TopRated { page } => write!(f, "top_rated[page={}]", page),
            QueryKey::Popular { page } => write!(f, "popular[page={}]", page),
            QueryKey::NowPlaying { page } => write!(f, "now_playing[page={}]", page),
            QueryKey::Upcoming { page } => write!(f, "upcoming[page={}]", page),
            QueryKey::MovieDetails { id } => write!(f, "movie_details[{}]", id),
            QueryKey::MovieCredits { id } => write!(f, "movie_credits[{}]", id),
            QueryKey::MovieVideos { id } => write!(f, "movie_videos[{}]", id),
            QueryKey::Recommendations { id, page } => write!(f, "recommendations[{}, page={}]", id, page),
            QueryKey::Search { query, page } => write!(f, "search[{:?}, page={}]", query, page),
            QueryKey::Genres => write!(f, "genres"),
            QueryKey::ByGenre { genre, page, sort } => {
                write!(f, "by_genre[{}, page={}, sort={}]", genre, page, sort)
            }
            QueryKey::Discover { filters, page } => {
                write!(f, "discover[")?;
                for (key, value) in filters.iter() {
                    write!(f, "{}={}, ", key, value)?;
                }
                write!(f, "page={}]", page)
            }
        }
    }
}

pub fn search_enabled(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SEARCH_CHARS
}

/// Genre ids start at 1; 0 stands for "nothing selected".
pub fn genre_enabled(genre: Option<GenreId>) -> bool {
    genre.is_some_and(|id| id != 0)
}

pub fn movie_enabled(id: Option<MovieId>) -> bool {
    id.is_some_and(|id| id != 0)
}
