use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::movie::{Genre, GenreId, MovieDetail, MovieId, MovieSummary};

/// A saved movie. Built only by the watchlist store, which stamps `added_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, with = "crate::dates::lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    pub fn from_candidate(candidate: WatchlistCandidate, added_at: DateTime<Utc>) -> Self {
        let genre_ids = candidate.resolved_genre_ids();
        Self {
            id: candidate.id,
            title: candidate.title,
            poster_path: candidate.poster_path,
            release_date: candidate.release_date,
            vote_average: candidate.vote_average,
            genre_ids,
            overview: candidate.overview,
            added_at,
        }
    }
}

/// Anything shaped like a movie summary that a user may save.
///
/// Genre information arrives either as a flat id list (list endpoints) or as
/// `{id, name}` pairs (the detail endpoint); either or both may be present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistCandidate {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, with = "crate::dates::lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<GenreId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Genre>>,
}

impl WatchlistCandidate {
    /// The direct list wins whenever it is present, even when empty.
    pub fn resolved_genre_ids(&self) -> Vec<GenreId> {
        if let Some(ids) = &self.genre_ids {
            return ids.clone();
        }
        self.genres
            .as_ref()
            .map(|genres| genres.iter().map(|genre| genre.id).collect())
            .unwrap_or_default()
    }
}

impl From<&MovieSummary> for WatchlistCandidate {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date,
            vote_average: movie.vote_average,
            overview: movie.overview.clone(),
            genre_ids: Some(movie.genre_ids.clone()),
            genres: None,
        }
    }
}

impl From<MovieSummary> for WatchlistCandidate {
    fn from(movie: MovieSummary) -> Self {
        Self::from(&movie)
    }
}

impl From<&MovieDetail> for WatchlistCandidate {
    fn from(movie: &MovieDetail) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date,
            vote_average: movie.vote_average,
            overview: movie.overview.clone(),
            genre_ids: None,
            genres: Some(movie.genres.clone()),
        }
    }
}

impl From<&WatchlistEntry> for WatchlistCandidate {
    fn from(entry: &WatchlistEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title.clone(),
            poster_path: entry.poster_path.clone(),
            release_date: entry.release_date,
            vote_average: entry.vote_average,
            overview: entry.overview.clone(),
            genre_ids: Some(entry.genre_ids.clone()),
            genres: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortCriterion {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "release_date")]
    ReleaseDate,
    #[serde(rename = "vote_average")]
    VoteAverage,
    #[default]
    #[serde(rename = "addedAt")]
    AddedAt,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 4] = [
        SortCriterion::AddedAt,
        SortCriterion::Title,
        SortCriterion::ReleaseDate,
        SortCriterion::VoteAverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::Title => "title",
            SortCriterion::ReleaseDate => "release_date",
            SortCriterion::VoteAverage => "vote_average",
            SortCriterion::AddedAt => "addedAt",
        }
    }

    /// Title ascending; every other criterion descending. Entries missing the
    /// key always sort after entries that have it.
    pub fn compare(&self, a: &WatchlistEntry, b: &WatchlistEntry) -> Ordering {
        match self {
            SortCriterion::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
            SortCriterion::ReleaseDate => descending_missing_last(a.release_date, b.release_date, |x, y| x.cmp(y)),
            SortCriterion::VoteAverage => descending_missing_last(a.vote_average, b.vote_average, |x, y| x.total_cmp(y)),
            SortCriterion::AddedAt => b.added_at.cmp(&a.added_at),
        }
    }
}

fn descending_missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&b, &a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "title" => Ok(SortCriterion::Title),
            "release_date" | "released" => Ok(SortCriterion::ReleaseDate),
            "vote_average" | "rating" => Ok(SortCriterion::VoteAverage),
            "addedat" | "added_at" | "added" => Ok(SortCriterion::AddedAt),
            _ => Err(format!(
                "Invalid sort criterion: {}. Use 'addedAt', 'title', 'release_date' or 'vote_average'",
                s
            )),
        }
    }
}

/// A sorted copy; the input order is left as it was. The sort is stable, so
/// entries with equal keys keep their relative order.
pub fn sort_entries(entries: &[WatchlistEntry], criterion: SortCriterion) -> Vec<WatchlistEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| criterion.compare(a, b));
    sorted
}
