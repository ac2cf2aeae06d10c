pub mod document;
pub mod query;
pub mod storage;
pub mod watchlist;

pub use document::{DocumentError, WATCHLIST_VERSION};
pub use query::{
    InfiniteQuery, InfiniteShape, MoviePage, MovieQueries, NextPage, QueryCache, QueryError, QueryKey, QueryOutcome,
    RetryPolicy, MIN_SEARCH_CHARS,
};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore, StorageError};
pub use watchlist::{WatchlistStore, WATCHLIST_KEY};
