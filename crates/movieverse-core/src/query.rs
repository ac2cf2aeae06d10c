//! Cached, coalesced and retried access to the catalog.

pub mod cache;
pub mod error;
pub mod infinite;
pub mod key;
pub mod queries;
pub mod retry;

pub use cache::QueryCache;
pub use error::QueryError;
pub use infinite::{InfiniteQuery, InfiniteShape, NextPage};
pub use key::{genre_enabled, movie_enabled, search_enabled, QueryFamily, QueryKey, MIN_SEARCH_CHARS};
pub use queries::{MoviePage, MovieQueries, QueryOutcome};
pub use retry::RetryPolicy;
