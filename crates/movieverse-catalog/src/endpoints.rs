use movieverse_models::MovieId;
use std::fmt;

/// Every catalog path this application reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Trending,
    TopRated,
    Popular,
    NowPlaying,
    Upcoming,
    MovieDetails(MovieId),
    MovieCredits(MovieId),
    MovieVideos(MovieId),
    MovieRecommendations(MovieId),
    SearchMovies,
    Genres,
    Discover,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Trending => "/trending/movie/week".to_string(),
            Endpoint::TopRated => "/movie/top_rated".to_string(),
            Endpoint::Popular => "/movie/popular".to_string(),
            Endpoint::NowPlaying => "/movie/now_playing".to_string(),
            Endpoint::Upcoming => "/movie/upcoming".to_string(),
            Endpoint::MovieDetails(id) => format!("/movie/{}", id),
            Endpoint::MovieCredits(id) => format!("/movie/{}/credits", id),
            Endpoint::MovieVideos(id) => format!("/movie/{}/videos", id),
            Endpoint::MovieRecommendations(id) => format!("/movie/{}/recommendations", id),
            Endpoint::SearchMovies => "/search/movie".to_string(),
            Endpoint::Genres => "/genre/movie/list".to_string(),
            Endpoint::Discover => "/discover/movie".to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
