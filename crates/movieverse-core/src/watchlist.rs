use chrono::{DateTime, Utc};
use movieverse_models::{sort_entries, MovieId, SortCriterion, WatchlistCandidate, WatchlistEntry};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::document;
use crate::storage::BlobStore;

/// Storage key of the durable watchlist record.
pub const WATCHLIST_KEY: &str = "movieverse_watchlist";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The user's saved movies.
///
/// Newest entries come first. Ids are unique. The whole collection is written
/// back after every change, except while the initial load is still pending:
/// until then nothing is written, so a slow load can never be overwritten.
pub struct WatchlistStore<S> {
    storage: S,
    entries: Vec<WatchlistEntry>,
    loading: bool,
    clock: Clock,
    snapshot: watch::Sender<Arc<Vec<WatchlistEntry>>>,
}

impl<S: BlobStore> WatchlistStore<S> {
    pub fn new(storage: S) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            storage,
            entries: Vec::new(),
            loading: true,
            clock: Arc::new(Utc::now),
            snapshot,
        }
    }

    pub async fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.initialize().await;
        store
    }

    /// Replace the timestamp source used for `addedAt`.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Load the stored record. Missing or unreadable data leaves an empty list.
    pub async fn initialize(&mut self) {
        self.entries = match self.storage.read(WATCHLIST_KEY).await {
            Ok(Some(raw)) => match document::decode(&raw) {
                Ok(entries) => {
                    info!("Loaded watchlist ({} entries)", entries.len());
                    entries
                }
                Err(e) => {
                    warn!("Ignoring unreadable watchlist record: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No stored watchlist, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read watchlist: {}", e);
                Vec::new()
            }
        };
        self.loading = false;
        self.publish();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns `false` when the movie was already saved; the original entry
    /// and its `addedAt` are kept.
    pub async fn add(&mut self, movie: impl Into<WatchlistCandidate>) -> bool {
        let candidate = movie.into();
        if self.is_present(candidate.id) {
            debug!("Movie {} already in watchlist", candidate.id);
            return false;
        }

        let entry = WatchlistEntry::from_candidate(candidate, (self.clock)());
        debug!("Adding movie {} ({}) to watchlist", entry.id, entry.title);
        self.entries.insert(0, entry);
        self.commit().await;
        true
    }

    /// Returns `false` when nothing was removed.
    pub async fn remove(&mut self, id: MovieId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() == before {
            return false;
        }
        debug!("Removed movie {} from watchlist", id);
        self.commit().await;
        true
    }

    /// Returns whether the movie is saved afterwards.
    pub async fn toggle(&mut self, movie: impl Into<WatchlistCandidate>) -> bool {
        let candidate = movie.into();
        if self.is_present(candidate.id) {
            self.remove(candidate.id).await;
            false
        } else {
            self.add(candidate).await
        }
    }

    pub fn is_present(&self, id: MovieId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Returns how many entries were removed.
    pub async fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        info!("Cleared watchlist ({} entries)", removed);
        self.commit().await;
        removed
    }

    /// A sorted copy; stored order is untouched.
    pub fn sorted(&self, criterion: SortCriterion) -> Vec<WatchlistEntry> {
        sort_entries(&self.entries, criterion)
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn get(&self, id: MovieId) -> Option<&WatchlistEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshots published after every in-memory change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<WatchlistEntry>>> {
        self.snapshot.subscribe()
    }

    async fn commit(&mut self) {
        self.publish();
        self.persist().await;
    }

    fn publish(&self) {
        self.snapshot.send_replace(Arc::new(self.entries.clone()));
    }

    async fn persist(&self) {
        if self.loading {
            debug!("Watchlist still loading, not writing");
            return;
        }

        let raw = match document::encode(&self.entries) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize watchlist: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.write(WATCHLIST_KEY, &raw).await {
            warn!("Failed to save watchlist: {}", e);
        }
    }
}

#[cfg(test)]
mod tests;
