use super::progress::with_spinner;
use super::{query_failed, AppContext};
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Color, Table};
use movieverse_config::{resolve_api_key, ApiKey, Config, CredentialStore};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(ctx: &AppContext, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(ctx, output),
        ConfigCommands::Check { online } => check_config(ctx, online, output).await,
        ConfigCommands::SetKey { key } => set_key(ctx, &key, output),
        ConfigCommands::RemoveKey => remove_key(ctx, output),
        ConfigCommands::Init { force } => init_config(ctx, force, output),
    }
}

fn section(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn show_config(ctx: &AppContext, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let config_file = ctx.paths.config_file();
    let key = resolve_api_key(Some(&ctx.credentials));

    if output.is_human() {
        let mut files = section("Files");
        files.add_row(vec![
            Cell::new("Config"),
            Cell::new(if config_file.exists() {
                config_file.display().to_string()
            } else {
                format!("{} (not created, using defaults)", config_file.display())
            }),
        ]);
        files.add_row(vec![Cell::new("Credentials"), Cell::new(ctx.credentials.path().display())]);
        files.add_row(vec![Cell::new("Watchlist"), Cell::new(ctx.paths.storage_dir().display())]);
        output.block(files);

        let mut catalog = section("Catalog");
        catalog.add_row(vec![
            Cell::new("API key"),
            Cell::new(match &key {
                Ok((key, source)) => format!("{} {}", key.masked(), format!("({})", source).bright_black()),
                Err(_) => "✗ not configured".red().to_string(),
            }),
        ]);
        catalog.add_row(vec![Cell::new("Base URL"), Cell::new(&config.catalog.base_url)]);
        catalog.add_row(vec![Cell::new("Image base URL"), Cell::new(&config.catalog.image_base_url)]);
        catalog.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.catalog.timeout_secs))]);
        output.block(catalog);

        let mut cache = section("Cache");
        cache.add_row(vec![Cell::new("Search fresh for"), Cell::new(format!("{}s", config.cache.search_stale_secs))]);
        cache.add_row(vec![Cell::new("Lists fresh for"), Cell::new(format!("{}s", config.cache.list_stale_secs))]);
        cache.add_row(vec![Cell::new("Details fresh for"), Cell::new(format!("{}s", config.cache.detail_stale_secs))]);
        cache.add_row(vec![Cell::new("Genres fresh for"), Cell::new(format!("{}s", config.cache.genre_stale_secs))]);
        cache.add_row(vec![Cell::new("Evict unused after"), Cell::new(format!("{}s", config.cache.gc_secs))]);
        cache.add_row(vec![
            Cell::new("Retries"),
            Cell::new(format!(
                "{} (backoff {}ms, max {}ms)",
                config.retry.retries, config.retry.base_delay_ms, config.retry.max_delay_ms
            )),
        ]);
        output.block(cache);
    }

    output.json(&json!({
        "config_file": config_file,
        "credentials_file": ctx.credentials.path(),
        "api_key": key.as_ref().ok().map(|(key, source)| json!({
            "masked": key.masked(),
            "source": source.to_string(),
        })),
        "config": config,
    }));
    Ok(())
}

async fn check_config(ctx: &AppContext, online: bool, output: &Output) -> Result<()> {
    ctx.config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", ctx.paths.config_file().display(), e))?;
    output.success("Configuration is valid");

    let (key, source) = resolve_api_key(Some(&ctx.credentials))?;
    output.success(format!("API key {} found in {}", key.masked(), source));

    if online {
        let queries = ctx.queries()?;
        let genres = with_spinner(output, "Contacting TMDB...", queries.genres())
            .await
            .map_err(query_failed)?;
        output.success(format!("TMDB accepted the key ({} genres available)", genres.len()));
    }
    Ok(())
}

fn set_key(ctx: &AppContext, raw: &str, output: &Output) -> Result<()> {
    let key = ApiKey::new(raw)?;

    let mut credentials = CredentialStore::new(ctx.paths.credentials_file());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    credentials.set_tmdb_api_key(key.expose().to_string());
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials.path().display(), e))?;

    output.success(format!("Saved API key {} to {}", key.masked(), credentials.path().display()));
    if std::env::var(movieverse_config::API_KEY_ENV).is_ok() || std::env::var(movieverse_config::FALLBACK_API_KEY_ENV).is_ok() {
        output.warn("An API key in the environment takes precedence over the credentials file.");
    }
    Ok(())
}

fn remove_key(ctx: &AppContext, output: &Output) -> Result<()> {
    let mut credentials = CredentialStore::new(ctx.paths.credentials_file());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;

    if credentials.get_tmdb_api_key().is_none() {
        output.info("No API key is stored in the credentials file.");
        return Ok(());
    }
    credentials.remove_tmdb_api_key();
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials.path().display(), e))?;
    output.success("Removed the stored API key");
    Ok(())
}

fn init_config(ctx: &AppContext, force: bool, output: &Output) -> Result<()> {
    let config_file = ctx.paths.config_file();
    if config_file.exists() && !force {
        output.warn(format!("{} already exists. Use --force to overwrite it.", config_file.display()));
        return Ok(());
    }

    ctx.paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;
    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}
