pub mod dates;
pub mod display;
pub mod movie;
pub mod page;
pub mod watchlist;

pub use movie::{CastMember, Credits, CrewMember, Genre, GenreId, GenreList, MovieDetail, MovieId, MovieSummary, Video, VideoList};
pub use page::PageResult;
pub use watchlist::{sort_entries, SortCriterion, WatchlistCandidate, WatchlistEntry};
