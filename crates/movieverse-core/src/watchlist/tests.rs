use super::*;
use crate::storage::{MemoryBlobStore, StorageError};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone};
use movieverse_models::{Genre, MovieDetail, MovieSummary};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

fn summary(id: u64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{}.jpg", id)),
        backdrop_path: None,
        release_date: None,
        vote_average: None,
        vote_count: 0,
        genre_ids: vec![28],
        overview: None,
    }
}

/// Each call returns one minute later than the previous one.
fn ticking_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
    let minutes = AtomicI64::new(0);
    move || {
        let n = minutes.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(n)
    }
}

async fn open_store() -> WatchlistStore<Arc<MemoryBlobStore>> {
    WatchlistStore::open(Arc::new(MemoryBlobStore::new())).await.with_clock(ticking_clock())
}

fn stored(storage: &MemoryBlobStore) -> Vec<WatchlistEntry> {
    document::decode(&storage.get(WATCHLIST_KEY).expect("record written")).unwrap()
}

struct FailingStore {
    writes: AtomicUsize,
}

#[async_trait]
impl BlobStore for FailingStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read {
            key: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }

    async fn write(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Write {
            key: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }
}

#[tokio::test]
async fn test_add_prepends_and_persists() {
    let storage = Arc::new(MemoryBlobStore::new());
    let mut store = WatchlistStore::open(storage.clone()).await.with_clock(ticking_clock());

    assert!(store.add(&summary(1, "First")).await);
    assert!(store.add(&summary(2, "Second")).await);

    let ids: Vec<_> = store.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(stored(&storage), store.entries().to_vec());
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_duplicate_add_keeps_first_entry() {
    let mut store = open_store().await;
    store.add(&summary(7, "Seven")).await;
    let original = store.get(7).unwrap().added_at;

    assert!(!store.add(&summary(7, "Seven again")).await);

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(7).unwrap().title, "Seven");
    assert_eq!(store.get(7).unwrap().added_at, original);
}

#[tokio::test]
async fn test_toggle_twice_restores_membership() {
    let storage = Arc::new(MemoryBlobStore::new());
    let mut store = WatchlistStore::open(storage.clone()).await;
    store.add(&summary(1, "Kept")).await;

    assert!(store.toggle(&summary(2, "Toggled")).await);
    assert!(store.is_present(2));
    assert!(!store.toggle(&summary(2, "Toggled")).await);
    assert!(!store.is_present(2));

    let ids: Vec<_> = stored(&storage).iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_remove_absent_is_noop() {
    let storage = Arc::new(MemoryBlobStore::new());
    let mut store = WatchlistStore::open(storage.clone()).await;
    assert!(!store.remove(42).await);
    assert_eq!(storage.get(WATCHLIST_KEY), None);
}

#[tokio::test]
async fn test_clear_empties_and_persists() {
    let storage = Arc::new(MemoryBlobStore::new());
    let mut store = WatchlistStore::open(storage.clone()).await;
    store.add(&summary(1, "A")).await;
    store.add(&summary(2, "B")).await;

    assert_eq!(store.clear().await, 2);
    assert!(store.is_empty());
    assert!(stored(&storage).is_empty());
}

#[tokio::test]
async fn test_genre_ids_resolution() {
    let mut store = open_store().await;

    let detail: MovieDetail = serde_json::from_value(serde_json::json!({
        "id": 10,
        "title": "Detail",
        "genres": [{"id": 18, "name": "Drama"}, {"id": 53, "name": "Thriller"}]
    }))
    .unwrap();
    store.add(&detail).await;
    assert_eq!(store.get(10).unwrap().genre_ids, vec![18, 53]);

    let both = WatchlistCandidate {
        genre_ids: Some(vec![99]),
        genres: Some(vec![Genre {
            id: 1,
            name: "Ignored".to_string(),
        }]),
        ..WatchlistCandidate::from(&summary(11, "Both"))
    };
    store.add(both).await;
    assert_eq!(store.get(11).unwrap().genre_ids, vec![99]);

    let neither = WatchlistCandidate {
        genre_ids: None,
        genres: None,
        ..WatchlistCandidate::from(&summary(12, "Neither"))
    };
    store.add(neither).await;
    assert!(store.get(12).unwrap().genre_ids.is_empty());
}

#[tokio::test]
async fn test_sorted_leaves_stored_order() {
    let mut store = open_store().await;
    let mut a = summary(1, "beta");
    a.release_date = NaiveDate::from_ymd_opt(2001, 1, 1);
    let mut b = summary(2, "Alpha");
    b.release_date = NaiveDate::from_ymd_opt(2010, 1, 1);
    store.add(&a).await;
    store.add(&b).await;

    let by_title: Vec<_> = store.sorted(SortCriterion::Title).iter().map(|e| e.id).collect();
    assert_eq!(by_title, vec![2, 1]);
    let by_added: Vec<_> = store.sorted(SortCriterion::AddedAt).iter().map(|e| e.id).collect();
    assert_eq!(by_added, vec![2, 1]);
    let by_date: Vec<_> = store.sorted(SortCriterion::ReleaseDate).iter().map(|e| e.id).collect();
    assert_eq!(by_date, vec![2, 1]);

    let stored_ids: Vec<_> = store.entries().iter().map(|e| e.id).collect();
    assert_eq!(stored_ids, vec![2, 1]);
}

#[tokio::test]
async fn test_added_at_comes_from_store_clock() {
    let mut store = open_store().await;
    store.add(&summary(1, "A")).await;
    store.add(&summary(2, "B")).await;
    assert_eq!(store.get(1).unwrap().added_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(store.get(2).unwrap().added_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap());
}

#[tokio::test]
async fn test_initialize_reads_existing_record() {
    let first = {
        let storage = Arc::new(MemoryBlobStore::new());
        let mut store = WatchlistStore::open(storage.clone()).await;
        store.add(&summary(5, "Saved")).await;
        storage.get(WATCHLIST_KEY).unwrap()
    };

    let storage = Arc::new(MemoryBlobStore::with_blob(WATCHLIST_KEY, &first));
    let store = WatchlistStore::open(storage).await;
    assert!(!store.is_loading());
    assert!(store.is_present(5));
}

#[tokio::test]
async fn test_corrupt_record_starts_empty() {
    let storage = Arc::new(MemoryBlobStore::with_blob(WATCHLIST_KEY, "{not json"));
    let store = WatchlistStore::open(storage).await;
    assert!(store.is_empty());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_storage_failures_are_not_fatal() {
    let storage = Arc::new(FailingStore {
        writes: AtomicUsize::new(0),
    });
    let mut store = WatchlistStore::open(storage.clone()).await;
    assert!(store.is_empty());

    assert!(store.add(&summary(1, "A")).await);
    assert!(store.is_present(1));
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_writes_while_loading() {
    let storage = Arc::new(MemoryBlobStore::with_blob(WATCHLIST_KEY, r#"{"version": 1, "entries": []}"#));
    let mut store = WatchlistStore::new(storage.clone());
    assert!(store.is_loading());

    store.add(&summary(1, "Early")).await;
    assert!(store.is_present(1));
    assert_eq!(storage.get(WATCHLIST_KEY).as_deref(), Some(r#"{"version": 1, "entries": []}"#));

    store.initialize().await;
    assert!(!store.is_present(1));
}

#[tokio::test]
async fn test_subscribers_see_changes() {
    let mut store = open_store().await;
    let mut rx = store.subscribe();
    assert!(rx.borrow_and_update().is_empty());

    store.add(&summary(3, "Watched")).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update()[0].id, 3);

    store.remove(3).await;
    assert!(rx.borrow().is_empty());
}

#[tokio::test]
async fn test_add_then_remove_round_trip() {
    let mut store = WatchlistStore::open(MemoryBlobStore::new()).await;
    let movie: WatchlistCandidate = serde_json::from_value(serde_json::json!({
        "id": 42,
        "title": "Example",
        "poster_path": "/p.jpg",
        "release_date": "2020-01-01",
        "vote_average": 7.5,
        "genre_ids": [1, 2]
    }))
    .unwrap();

    store.add(movie).await;
    assert!(store.is_present(42));
    let sorted = store.sorted(SortCriterion::Title);
    assert_eq!(sorted.len(), 1);
    assert_eq!(sorted[0].id, 42);
    assert_eq!(sorted[0].genre_ids, vec![1, 2]);
    assert_eq!(sorted[0].release_date, NaiveDate::from_ymd_opt(2020, 1, 1));

    store.remove(42).await;
    assert!(!store.is_present(42));
    assert!(store.sorted(SortCriterion::default()).is_empty());
}
