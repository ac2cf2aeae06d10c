use movieverse_models::GenreId;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DiscoverSort {
    #[default]
    PopularityDesc,
    VoteAverageDesc,
    ReleaseDateDesc,
    ReleaseDateAsc,
}

impl DiscoverSort {
    pub const ALL: [DiscoverSort; 4] = [
        DiscoverSort::PopularityDesc,
        DiscoverSort::VoteAverageDesc,
        DiscoverSort::ReleaseDateDesc,
        DiscoverSort::ReleaseDateAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoverSort::PopularityDesc => "popularity.desc",
            DiscoverSort::VoteAverageDesc => "vote_average.desc",
            DiscoverSort::ReleaseDateDesc => "release_date.desc",
            DiscoverSort::ReleaseDateAsc => "release_date.asc",
        }
    }
}

impl fmt::Display for DiscoverSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoverSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        DiscoverSort::ALL
            .into_iter()
            .find(|sort| sort.as_str() == normalized || sort.as_str().replace('.', "_") == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid sort: {}. Use one of: {}",
                    s,
                    DiscoverSort::ALL.map(|sort| sort.as_str()).join(", ")
                )
            })
    }
}

/// Arbitrary `/discover/movie` filter parameters.
///
/// Kept in a sorted map so two filter sets with the same content always
/// produce the same request (and the same cache key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DiscoverFilters {
    params: BTreeMap<String, String>,
}

impl DiscoverFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn with_genres(self, genres: &[GenreId]) -> Self {
        let joined = genres.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
        self.set("with_genres", joined)
    }

    pub fn sort_by(self, sort: DiscoverSort) -> Self {
        self.set("sort_by", sort.as_str())
    }

    pub fn primary_release_year(self, year: i32) -> Self {
        self.set("primary_release_year", year)
    }

    pub fn vote_count_gte(self, count: u32) -> Self {
        self.set("vote_count.gte", count)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
