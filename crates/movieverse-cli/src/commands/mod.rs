pub mod browse;
pub mod config;
pub mod progress;
pub mod render;
pub mod watchlist;

use color_eyre::eyre::{eyre, Report};
use color_eyre::Result;
use movieverse_catalog::{Catalog, CatalogClient};
use movieverse_config::{Config, CredentialStore, PathManager};
use movieverse_core::{FileBlobStore, MovieQueries, QueryError, WatchlistStore};
use movieverse_models::MovieId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs from disk, loaded once at startup.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();

        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        let mut credentials = CredentialStore::new(paths.credentials_file());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials.path().display(), e))?;

        Ok(Self {
            paths,
            config,
            credentials,
        })
    }

    pub fn client(&self) -> Result<CatalogClient> {
        Ok(CatalogClient::from_config(&self.config, Some(&self.credentials))?)
    }

    pub fn queries(&self) -> Result<MovieQueries<dyn Catalog>> {
        Ok(self.queries_for(self.client()?))
    }

    /// For commands that also need the client itself (image URLs).
    pub fn queries_for(&self, client: CatalogClient) -> MovieQueries<dyn Catalog> {
        let catalog: Arc<dyn Catalog> = Arc::new(client);
        MovieQueries::from_config(catalog, &self.config)
    }

    /// Ids on the watchlist, for marking saved movies in listings.
    pub async fn saved_ids(&self) -> HashSet<MovieId> {
        match self.watchlist().await {
            Ok(store) => store.entries().iter().map(|entry| entry.id).collect(),
            Err(e) => {
                debug!("Watchlist unavailable for listing: {}", e);
                HashSet::new()
            }
        }
    }

    pub async fn watchlist(&self) -> Result<WatchlistStore<FileBlobStore>> {
        let storage = FileBlobStore::from_paths(&self.paths).map_err(|e| eyre!("Failed to prepare watchlist storage: {}", e))?;
        Ok(WatchlistStore::open(storage).await)
    }
}

/// Keep the friendly message on top and the underlying chain below it.
pub fn query_failed(err: QueryError) -> Report {
    let message = err.user_message();
    Report::new(err).wrap_err(message)
}
