use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Color, Table};
use movieverse_catalog::{CatalogClient, ImageKind, ImageSize};
use movieverse_models::display::{format_currency, format_rating, format_runtime, format_year, NOT_AVAILABLE};
use movieverse_models::{Genre, MovieDetail, MovieSummary, WatchlistEntry};
use owo_colors::OwoColorize;
use std::collections::HashSet;
use std::fmt::Write;

const CAST_LIMIT: usize = 8;

fn header(columns: &[&str]) -> Vec<Cell> {
    columns
        .iter()
        .map(|name| Cell::new(name).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

fn styled_table(columns: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(header(columns));
    table
}

fn saved_marker(saved: bool) -> String {
    if saved {
        "★".yellow().to_string()
    } else {
        String::new()
    }
}

/// Movies as a table, marking the ones already on the watchlist.
pub fn movie_table(movies: &[MovieSummary], saved: &HashSet<u64>) -> Table {
    let mut table = styled_table(&["ID", "Title", "Year", "Rating", "Saved"]);
    for movie in movies {
        table.add_row(vec![
            Cell::new(movie.id),
            Cell::new(&movie.title),
            Cell::new(format_year(movie.release_date)),
            Cell::new(format_rating(movie.vote_average)),
            Cell::new(saved_marker(saved.contains(&movie.id))),
        ]);
    }
    table
}

pub fn watchlist_table(entries: &[WatchlistEntry]) -> Table {
    let mut table = styled_table(&["ID", "Title", "Year", "Rating", "Added"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(&entry.title),
            Cell::new(format_year(entry.release_date)),
            Cell::new(format_rating(entry.vote_average)),
            Cell::new(entry.added_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table
}

pub fn genre_table(genres: &[Genre]) -> Table {
    let mut table = styled_table(&["ID", "Genre"]);
    for genre in genres {
        table.add_row(vec![Cell::new(genre.id), Cell::new(&genre.name)]);
    }
    table
}

/// Footer line under a list: which page out of how many.
pub fn page_footer(page: u32, total_pages: u32, total_results: u64) -> String {
    format!("Page {} of {} ({} results)", page, total_pages, total_results)
        .bright_black()
        .to_string()
}

/// Multi-line block for a single movie: facts, cast, director, trailer and poster.
pub fn movie_detail(movie: &MovieDetail, client: &CatalogClient, saved: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} ({}) {}",
        movie.title.bright_cyan().bold(),
        format_year(movie.release_date),
        saved_marker(saved)
    );
    if let Some(tagline) = movie.tagline.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "{}", tagline.italic());
    }
    let _ = writeln!(out);

    let genres = movie.genre_names();
    let mut facts = Table::new();
    facts.load_preset(UTF8_FULL);
    facts.apply_modifier(UTF8_ROUND_CORNERS);
    facts.add_row(vec![Cell::new("Rating"), Cell::new(format!("{} ({} votes)", format_rating(movie.vote_average), movie.vote_count))]);
    facts.add_row(vec![Cell::new("Runtime"), Cell::new(format_runtime(movie.runtime))]);
    facts.add_row(vec![
        Cell::new("Genres"),
        Cell::new(if genres.is_empty() { NOT_AVAILABLE.to_string() } else { genres.join(", ") }),
    ]);
    facts.add_row(vec![Cell::new("Director"), Cell::new(movie.director().unwrap_or(NOT_AVAILABLE))]);
    facts.add_row(vec![Cell::new("Status"), Cell::new(movie.status.as_deref().unwrap_or(NOT_AVAILABLE))]);
    facts.add_row(vec![Cell::new("Budget"), Cell::new(format_currency(movie.budget))]);
    facts.add_row(vec![Cell::new("Revenue"), Cell::new(format_currency(movie.revenue))]);
    let _ = writeln!(out, "{}", facts);

    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
        let _ = writeln!(out, "\n{}", overview);
    }

    let cast = movie.top_cast(CAST_LIMIT);
    if !cast.is_empty() {
        let _ = writeln!(out, "\n{}", "Cast".bold());
        for member in cast {
            match member.character.as_deref().filter(|c| !c.is_empty()) {
                Some(character) => {
                    let _ = writeln!(out, "  {} as {}", member.name, character.bright_black());
                }
                None => {
                    let _ = writeln!(out, "  {}", member.name);
                }
            }
        }
    }

    if let Some(url) = movie.trailer().and_then(|video| video.watch_url()) {
        let _ = writeln!(out, "\n{} {}", "Trailer:".bold(), url);
    }
    let poster = client
        .image_url(movie.poster_path.as_deref(), ImageSize::Large, ImageKind::Poster)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let _ = write!(out, "{} {}", "Poster:".bold(), poster);

    out
}
