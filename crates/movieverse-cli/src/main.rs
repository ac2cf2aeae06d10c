use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{browse, config, watchlist, AppContext};
use movieverse_catalog::DiscoverSort;
use movieverse_models::{GenreId, MovieId, SortCriterion};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "movieverse")]
#[command(about = "MovieVerse - discover movies and keep a watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Movies trending this week
    #[command(long_about = "List this week's trending movies. With --pages, keeps loading pages and prints the accumulated list.")]
    Trending {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Accumulate this many pages starting at page 1
        #[arg(long, conflicts_with = "page")]
        pages: Option<u32>,
    },
    /// Most popular movies
    Popular {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Highest rated movies
    TopRated {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Movies currently in theaters
    NowPlaying {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Upcoming releases
    Upcoming {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search movies by title
    #[command(long_about = "Search movies by title. Queries shorter than three characters are not sent.")]
    Search {
        query: String,

        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Accumulate this many pages starting at page 1
        #[arg(long, conflicts_with = "page")]
        pages: Option<u32>,
    },
    /// List the genre catalog
    Genres,
    /// Browse movies by genre and other filters
    #[command(long_about = "Browse the catalog with filters. A single --genre with no other filter uses the genre listing (and supports --pages).")]
    Discover {
        /// Genre id (see `movieverse genres`)
        #[arg(long)]
        genre: Option<GenreId>,

        /// Primary release year
        #[arg(long)]
        year: Option<i32>,

        /// Minimum number of votes
        #[arg(long)]
        min_votes: Option<u32>,

        /// popularity.desc, vote_average.desc, release_date.desc or release_date.asc
        #[arg(long, default_value = "popularity.desc")]
        sort: DiscoverSort,

        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Accumulate this many pages of a genre listing
        #[arg(long, conflicts_with_all = ["page", "year", "min_votes"], requires = "genre")]
        pages: Option<u32>,
    },
    /// Show one movie with cast, crew and trailer
    Movie {
        id: MovieId,

        /// Also list recommendations
        #[arg(long, action = ArgAction::SetTrue)]
        recommendations: bool,
    },
    /// Manage the local watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: Option<WatchlistCommands>,
    },
    /// Manage the API key and settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum WatchlistCommands {
    /// List saved movies
    List {
        /// title, release_date, vote_average or addedAt
        #[arg(long, default_value = "addedAt")]
        sort: SortCriterion,
    },
    /// Save a movie by id
    Add { id: MovieId },
    /// Remove a movie by id
    Remove { id: MovieId },
    /// Save a movie, or remove it if already saved
    Toggle { id: MovieId },
    /// Remove every saved movie
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Number of saved movies
    Count,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current settings (the API key is masked)
    Show,
    /// Verify the configuration and API key
    Check {
        /// Also send one request to confirm the key is accepted
        #[arg(long, action = ArgAction::SetTrue)]
        online: bool,
    },
    /// Store the TMDB API key in the credentials file
    SetKey { key: String },
    /// Delete the stored TMDB API key
    RemoveKey,
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let ctx = AppContext::load()?;

    logging::init_logging(cli.verbose, cli.quiet, &ctx.config.logging).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Trending { page, pages } => match pages {
            Some(pages) => browse::run_trending_pages(&ctx, pages, &output).await,
            None => browse::run_list(&ctx, browse::ListKind::Trending, page, &output).await,
        },
        Commands::Popular { page } => browse::run_list(&ctx, browse::ListKind::Popular, page, &output).await,
        Commands::TopRated { page } => browse::run_list(&ctx, browse::ListKind::TopRated, page, &output).await,
        Commands::NowPlaying { page } => browse::run_list(&ctx, browse::ListKind::NowPlaying, page, &output).await,
        Commands::Upcoming { page } => browse::run_list(&ctx, browse::ListKind::Upcoming, page, &output).await,
        Commands::Search { query, page, pages } => browse::run_search(&ctx, &query, page, pages, &output).await,
        Commands::Genres => browse::run_genres(&ctx, &output).await,
        Commands::Discover {
            genre,
            year,
            min_votes,
            sort,
            page,
            pages,
        } => {
            let filters = browse::DiscoverArgs {
                genre,
                year,
                min_votes,
                sort,
            };
            browse::run_discover(&ctx, filters, page, pages, &output).await
        }
        Commands::Movie { id, recommendations } => browse::run_movie(&ctx, id, recommendations, &output).await,
        Commands::Watchlist { cmd } => {
            let cmd = cmd.unwrap_or(WatchlistCommands::List {
                sort: SortCriterion::default(),
            });
            watchlist::run_watchlist(&ctx, cmd, &output).await
        }
        Commands::Config { cmd } => config::run_config(&ctx, cmd, &output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_watchlist_defaults_to_list() {
        let cli = Cli::try_parse_from(["movieverse", "watchlist"]).unwrap();
        assert!(matches!(cli.command, Commands::Watchlist { cmd: None }));
    }

    #[test]
    fn test_discover_parses_sort_and_genre() {
        let cli = Cli::try_parse_from(["movieverse", "discover", "--genre", "28", "--sort", "vote_average.desc"]).unwrap();
        match cli.command {
            Commands::Discover { genre, sort, .. } => {
                assert_eq!(genre, Some(28));
                assert_eq!(sort, DiscoverSort::VoteAverageDesc);
            }
            _ => panic!("expected discover"),
        }
    }

    #[test]
    fn test_pages_conflicts_with_page() {
        assert!(Cli::try_parse_from(["movieverse", "trending", "--page", "2", "--pages", "3"]).is_err());
    }
}
