use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::error::QueryError;
use super::key::QueryKey;

type InFlight<V> = Shared<BoxFuture<'static, Result<V, QueryError>>>;

struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
    last_access: Instant,
}

struct CacheState<V> {
    entries: HashMap<QueryKey, CacheEntry<V>>,
    /// Each fetch carries the ticket it was registered with; a completion
    /// whose ticket is no longer current was invalidated and is discarded.
    in_flight: HashMap<QueryKey, (u64, InFlight<V>)>,
    next_ticket: u64,
}

impl<V> CacheState<V> {
    fn is_current(&self, key: &QueryKey, ticket: u64) -> bool {
        self.in_flight.get(key).is_some_and(|(current, _)| *current == ticket)
    }
}

/// Keyed results with stale-while-valid reuse and in-flight coalescing.
///
/// * fresh hit: the cached value, no fetch
/// * stale hit: the cached value, plus one background refresh
/// * miss: one fetch shared by every concurrent caller of the same key
///
/// Failures are never cached. Entries untouched for longer than the
/// garbage-collection window are dropped.
pub struct QueryCache<V> {
    state: Arc<Mutex<CacheState<V>>>,
    gc_after: Duration,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            gc_after: self.gc_after,
        }
    }
}

enum Lookup<V> {
    Hit(V),
    Wait(InFlight<V>),
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(gc_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                next_ticket: 0,
            })),
            gc_after,
        }
    }

    /// Resolve `key`, calling `fetch` only when no usable value or in-flight
    /// request exists.
    pub async fn get<F, Fut>(&self, key: QueryKey, stale_after: Duration, fetch: F) -> Result<V, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let lookup = {
            let mut state = self.lock();
            let now = Instant::now();
            self.collect_garbage(&mut state, now);

            let cached = state.entries.get_mut(&key).map(|entry| {
                entry.last_access = now;
                (entry.value.clone(), now.duration_since(entry.fetched_at) < stale_after)
            });

            match cached {
                Some((value, true)) => {
                    debug!("Cache hit: {}", key);
                    Lookup::Hit(value)
                }
                Some((value, false)) => {
                    if !state.in_flight.contains_key(&key) {
                        debug!("Cache stale: {}, refreshing in background", key);
                        let refresh = self.start(&mut state, key, fetch());
                        spawn_refresh(refresh);
                    }
                    Lookup::Hit(value)
                }
                None => match state.in_flight.get(&key).map(|(_, pending)| pending.clone()) {
                    Some(pending) => {
                        debug!("Joining in-flight request: {}", key);
                        Lookup::Wait(pending)
                    }
                    None => {
                        debug!("Cache miss: {}", key);
                        Lookup::Wait(self.start(&mut state, key, fetch()))
                    }
                },
            }
        };

        match lookup {
            Lookup::Hit(value) => Ok(value),
            Lookup::Wait(pending) => pending.await,
        }
    }

    /// The cached value, fresh or stale, without fetching.
    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        self.lock().entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    /// Drop a cached value so the next access fetches again. A fetch already
    /// running for `key` still answers its waiters but is not stored.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let mut state = self.lock();
        let abandoned = state.in_flight.remove(key).is_some();
        state.entries.remove(key).is_some() || abandoned
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.in_flight.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a shared fetch whose completion updates the cache.
    fn start<Fut>(&self, state: &mut CacheState<V>, key: QueryKey, fetch: Fut) -> InFlight<V>
    where
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let ticket = state.next_ticket;
        state.next_ticket += 1;

        let shared_state = Arc::clone(&self.state);
        let task_key = key.clone();
        let pending = async move {
            let result = fetch.await;
            let mut state = shared_state.lock().unwrap_or_else(|e| e.into_inner());
            if !state.is_current(&task_key, ticket) {
                debug!("Discarding result of invalidated fetch: {}", task_key);
                return result;
            }
            state.in_flight.remove(&task_key);
            if let Ok(value) = &result {
                let now = Instant::now();
                state.entries.insert(
                    task_key,
                    CacheEntry {
                        value: value.clone(),
                        fetched_at: now,
                        last_access: now,
                    },
                );
            }
            result
        }
        .boxed()
        .shared();

        state.in_flight.insert(key, (ticket, pending.clone()));
        pending
    }

    fn collect_garbage(&self, state: &mut CacheState<V>, now: Instant) {
        let before = state.entries.len();
        let gc_after = self.gc_after;
        state
            .entries
            .retain(|_, entry| now.duration_since(entry.last_access) < gc_after);
        let evicted = before - state.entries.len();
        if evicted > 0 {
            debug!("Evicted {} unused cache entries", evicted);
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn spawn_refresh<V>(refresh: InFlight<V>)
where
    V: Clone + Send + Sync + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(e) = refresh.await {
                    warn!("Background refresh failed, keeping cached value: {}", e);
                }
            });
        }
        Err(_) => debug!("No async runtime, skipping background refresh"),
    }
}
