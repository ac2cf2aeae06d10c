use super::progress::{with_spinner, Spinner};
use super::{query_failed, render, AppContext};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use movieverse_catalog::{Catalog, DiscoverFilters, DiscoverSort};
use movieverse_core::{InfiniteQuery, InfiniteShape, MoviePage, NextPage, QueryOutcome, MIN_SEARCH_CHARS};
use movieverse_models::{GenreId, MovieId};
use serde_json::json;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub enum ListKind {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
}

impl ListKind {
    fn label(&self) -> &'static str {
        match self {
            ListKind::Trending => "Trending this week",
            ListKind::Popular => "Popular",
            ListKind::TopRated => "Top rated",
            ListKind::NowPlaying => "Now playing",
            ListKind::Upcoming => "Upcoming",
        }
    }
}

pub struct DiscoverArgs {
    pub genre: Option<GenreId>,
    pub year: Option<i32>,
    pub min_votes: Option<u32>,
    pub sort: DiscoverSort,
}

impl DiscoverArgs {
    /// Only a genre was given, so the dedicated genre listing applies.
    fn is_genre_only(&self) -> bool {
        self.genre.is_some() && self.year.is_none() && self.min_votes.is_none()
    }

    fn filters(&self) -> DiscoverFilters {
        let mut filters = DiscoverFilters::new().sort_by(self.sort);
        if let Some(genre) = self.genre {
            filters = filters.with_genres(&[genre]);
        }
        if let Some(year) = self.year {
            filters = filters.primary_release_year(year);
        }
        if let Some(min_votes) = self.min_votes {
            filters = filters.vote_count_gte(min_votes);
        }
        filters
    }
}

pub async fn run_list(ctx: &AppContext, kind: ListKind, page: u32, output: &Output) -> Result<()> {
    let queries = ctx.queries()?;
    let result = with_spinner(output, format!("Loading {}...", kind.label().to_lowercase()), async {
        match kind {
            ListKind::Trending => queries.trending(page).await,
            ListKind::Popular => queries.popular(page).await,
            ListKind::TopRated => queries.top_rated(page).await,
            ListKind::NowPlaying => queries.now_playing(page).await,
            ListKind::Upcoming => queries.upcoming(page).await,
        }
    })
    .await
    .map_err(query_failed)?;

    show_page(ctx, kind.label(), &result, output).await
}

pub async fn run_trending_pages(ctx: &AppContext, pages: u32, output: &Output) -> Result<()> {
    let queries = ctx.queries()?;
    let query = queries.infinite(InfiniteShape::Trending);
    accumulate(ctx, &query, pages, ListKind::Trending.label(), output).await
}

pub async fn run_search(ctx: &AppContext, text: &str, page: u32, pages: Option<u32>, output: &Output) -> Result<()> {
    let queries = ctx.queries()?;
    let title = format!("Results for \"{}\"", text.trim());

    if let Some(pages) = pages {
        let query = queries.infinite(InfiniteShape::search(text));
        return accumulate(ctx, &query, pages, &title, output).await;
    }

    let outcome = with_spinner(output, "Searching...", queries.search(text, page))
        .await
        .map_err(query_failed)?;
    match outcome {
        QueryOutcome::Ready(result) => show_page(ctx, &title, &result, output).await,
        QueryOutcome::Disabled => {
            output.warn(format!("Type at least {} characters to search.", MIN_SEARCH_CHARS));
            Ok(())
        }
    }
}

pub async fn run_genres(ctx: &AppContext, output: &Output) -> Result<()> {
    let queries = ctx.queries()?;
    let genres = with_spinner(output, "Loading genres...", queries.genres())
        .await
        .map_err(query_failed)?;

    output.block(render::genre_table(&genres));
    output.json(&json!({ "genres": genres.as_slice() }));
    Ok(())
}

pub async fn run_discover(
    ctx: &AppContext,
    args: DiscoverArgs,
    page: u32,
    pages: Option<u32>,
    output: &Output,
) -> Result<()> {
    let queries = ctx.queries()?;

    if args.is_genre_only() {
        let title = format!("Genre {} by {}", args.genre.unwrap_or_default(), args.sort);
        if let (Some(pages), Some(genre)) = (pages, args.genre) {
            let query = queries.infinite(InfiniteShape::ByGenre { genre, sort: args.sort });
            return accumulate(ctx, &query, pages, &title, output).await;
        }
        let outcome = with_spinner(output, "Loading genre...", queries.movies_by_genre(args.genre, page, args.sort))
            .await
            .map_err(query_failed)?;
        return match outcome {
            QueryOutcome::Ready(result) => show_page(ctx, &title, &result, output).await,
            QueryOutcome::Disabled => {
                output.warn("Pick a genre id from `movieverse genres`.");
                Ok(())
            }
        };
    }

    let filters = args.filters();
    let result = with_spinner(output, "Discovering...", queries.discover(&filters, page))
        .await
        .map_err(query_failed)?;
    show_page(ctx, &format!("Discover ({})", args.sort), &result, output).await
}

pub async fn run_movie(ctx: &AppContext, id: MovieId, recommendations: bool, output: &Output) -> Result<()> {
    let client = ctx.client()?;
    let queries = ctx.queries_for(client.clone());

    let detail = match with_spinner(output, format!("Loading movie {}...", id), queries.movie_details(Some(id)))
        .await
        .map_err(query_failed)?
    {
        QueryOutcome::Ready(detail) => detail,
        QueryOutcome::Disabled => return Err(eyre!("Movie id must be a positive number")),
    };
    info!(movie_id = detail.id, title = %detail.title, "Loaded movie");

    let similar = if recommendations {
        with_spinner(output, "Loading recommendations...", queries.recommendations(Some(id), 1))
            .await
            .map_err(query_failed)?
            .ready()
    } else {
        None
    };

    let saved = ctx.saved_ids().await;
    output.block(render::movie_detail(&detail, &client, saved.contains(&detail.id)));
    if let Some(page) = &similar {
        output.block("\nRecommendations");
        output.block(render::movie_table(&page.results, &saved));
    }

    output.json(&json!({
        "movie": &*detail,
        "recommendations": similar.as_ref().map(|page| page.results.as_slice()),
    }));
    Ok(())
}

async fn show_page(ctx: &AppContext, title: &str, result: &MoviePage, output: &Output) -> Result<()> {
    if output.is_human() {
        let saved = ctx.saved_ids().await;
        if result.is_empty() {
            output.info(format!("{}: no movies found.", title));
            return Ok(());
        }
        output.block(title);
        output.block(render::movie_table(&result.results, &saved));
        output.block(render::page_footer(result.page, result.total_pages, result.total_results));
    }
    output.json(&serde_json::to_value(&**result)?);
    Ok(())
}

/// Load pages of an infinite query until `pages` are held or the list ends.
async fn accumulate(
    ctx: &AppContext,
    query: &InfiniteQuery<dyn Catalog>,
    pages: u32,
    title: &str,
    output: &Output,
) -> Result<()> {
    let pages = pages.max(1) as usize;
    let spinner = Spinner::start(output, format!("Loading {}...", query.shape()));

    if query.load().await.map_err(query_failed)? == NextPage::Disabled {
        drop(spinner);
        output.warn(format!("Nothing to load for {}: check the search text or genre.", query.shape()));
        return Ok(());
    }

    while query.page_count() < pages && query.has_next_page() {
        spinner.set_message(format!("Loading page {}...", query.page_count() + 1));
        match query.fetch_next_page().await.map_err(query_failed)? {
            NextPage::Fetched(_) => {}
            NextPage::InFlight
            | NextPage::Exhausted
            | NextPage::AlreadyLoaded
            | NextPage::Disabled
            | NextPage::Discarded => break,
        }
    }
    drop(spinner);

    let results = query.results();
    let last = query.pages().last().cloned();
    if output.is_human() {
        let saved = ctx.saved_ids().await;
        output.block(title);
        output.block(render::movie_table(&results, &saved));
        if let Some(last) = &last {
            output.block(render::page_footer(last.page, last.total_pages, last.total_results));
        }
    }
    output.json(&json!({
        "pages": query.page_count(),
        "has_next_page": query.has_next_page(),
        "results": results,
    }));
    Ok(())
}
