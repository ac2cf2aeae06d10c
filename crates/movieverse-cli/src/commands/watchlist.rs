use super::progress::with_spinner;
use super::{query_failed, render, AppContext};
use crate::output::Output;
use crate::WatchlistCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::Confirm;
use movieverse_core::QueryOutcome;
use movieverse_models::{MovieDetail, MovieId, SortCriterion, WatchlistCandidate};
use serde_json::json;
use std::io::IsTerminal;
use std::sync::Arc;

pub async fn run_watchlist(ctx: &AppContext, cmd: WatchlistCommands, output: &Output) -> Result<()> {
    match cmd {
        WatchlistCommands::List { sort } => list(ctx, sort, output).await,
        WatchlistCommands::Add { id } => add(ctx, id, output).await,
        WatchlistCommands::Remove { id } => remove(ctx, id, output).await,
        WatchlistCommands::Toggle { id } => toggle(ctx, id, output).await,
        WatchlistCommands::Clear { yes } => clear(ctx, yes, output).await,
        WatchlistCommands::Count => count(ctx, output).await,
    }
}

async fn list(ctx: &AppContext, sort: SortCriterion, output: &Output) -> Result<()> {
    let store = ctx.watchlist().await?;
    let entries = store.sorted(sort);

    if entries.is_empty() {
        output.info("Your watchlist is empty. Add a movie with `movieverse watchlist add <id>`.");
    } else {
        output.block(render::watchlist_table(&entries));
    }
    output.json(&json!({ "sort": sort.as_str(), "entries": entries }));
    Ok(())
}

async fn add(ctx: &AppContext, id: MovieId, output: &Output) -> Result<()> {
    let mut store = ctx.watchlist().await?;
    if let Some(entry) = store.get(id) {
        output.info(format!("{} is already on your watchlist.", entry.title));
        return Ok(());
    }

    let movie = fetch_movie(ctx, id, output).await?;
    store.add(&*movie).await;
    output.success(format!("Added {} to your watchlist ({} saved).", movie.title, store.len()));
    Ok(())
}

async fn remove(ctx: &AppContext, id: MovieId, output: &Output) -> Result<()> {
    let mut store = ctx.watchlist().await?;
    let title = store.get(id).map(|entry| entry.title.clone());

    match title {
        Some(title) if store.remove(id).await => output.success(format!("Removed {} from your watchlist.", title)),
        _ => output.warn(format!("Movie {} is not on your watchlist.", id)),
    }
    Ok(())
}

/// Saved movies are removed without a network call; others are looked up first.
async fn toggle(ctx: &AppContext, id: MovieId, output: &Output) -> Result<()> {
    let mut store = ctx.watchlist().await?;

    let candidate = match store.get(id) {
        Some(entry) => WatchlistCandidate::from(entry),
        None => WatchlistCandidate::from(&*fetch_movie(ctx, id, output).await?),
    };
    let title = candidate.title.clone();

    if store.toggle(candidate).await {
        output.success(format!("Added {} to your watchlist.", title));
    } else {
        output.success(format!("Removed {} from your watchlist.", title));
    }
    Ok(())
}

async fn clear(ctx: &AppContext, yes: bool, output: &Output) -> Result<()> {
    let mut store = ctx.watchlist().await?;
    if store.is_empty() {
        output.info("Your watchlist is already empty.");
        return Ok(());
    }

    if !yes {
        if !std::io::stdin().is_terminal() {
            return Err(eyre!("Refusing to clear the watchlist without confirmation. Pass --yes to skip the prompt."));
        }
        let prompt = format!("Remove all {} movies from your watchlist?", store.len());
        if !confirm(&prompt, output)? {
            output.info("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.clear().await;
    output.success(format!("Cleared {} movies from your watchlist.", removed));
    Ok(())
}

async fn count(ctx: &AppContext, output: &Output) -> Result<()> {
    let store = ctx.watchlist().await?;
    let count = store.len();

    output.info(match count {
        1 => "1 movie on your watchlist.".to_string(),
        n => format!("{} movies on your watchlist.", n),
    });
    output.json(&json!({ "count": count }));
    Ok(())
}

async fn fetch_movie(ctx: &AppContext, id: MovieId, output: &Output) -> Result<Arc<MovieDetail>> {
    let queries = ctx.queries()?;
    let outcome = with_spinner(output, format!("Looking up movie {}...", id), queries.movie_details(Some(id)))
        .await
        .map_err(query_failed)?;
    match outcome {
        QueryOutcome::Ready(movie) => Ok(movie),
        QueryOutcome::Disabled => Err(eyre!("Movie id must be a positive number")),
    }
}

fn confirm(prompt: &str, output: &Output) -> Result<bool> {
    Confirm::new().with_prompt(prompt).default(false).interact().map_err(|e| {
        output.error(format!("Failed to read confirmation: {}", e));
        eyre!("Failed to read confirmation: {}", e)
    })
}
