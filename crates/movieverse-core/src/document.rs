use movieverse_models::WatchlistEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

pub const WATCHLIST_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("watchlist record is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("watchlist record has unsupported version {0} (expected {})", WATCHLIST_VERSION)]
    UnsupportedVersion(u64),
}

#[derive(Serialize)]
struct WatchlistDocumentRef<'a> {
    version: u32,
    entries: &'a [WatchlistEntry],
}

#[derive(Deserialize)]
struct WatchlistDocument {
    #[serde(default)]
    entries: Vec<WatchlistEntry>,
}

pub fn encode(entries: &[WatchlistEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WatchlistDocumentRef {
        version: WATCHLIST_VERSION,
        entries,
    })
}

/// Decode a stored record. Repeated ids keep their first occurrence.
///
/// Records written before versioning were a bare array of entries and are
/// still accepted.
pub fn decode(raw: &str) -> Result<Vec<WatchlistEntry>, DocumentError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let entries: Vec<WatchlistEntry> = if value.is_array() {
        let entries: Vec<WatchlistEntry> = serde_json::from_value(value)?;
        debug!("Read unversioned watchlist record ({} entries)", entries.len());
        entries
    } else {
        match value.get("version").and_then(serde_json::Value::as_u64) {
            Some(version) if version == u64::from(WATCHLIST_VERSION) => {
                serde_json::from_value::<WatchlistDocument>(value)?.entries
            }
            Some(version) => return Err(DocumentError::UnsupportedVersion(version)),
            None => serde_json::from_value::<WatchlistDocument>(value)?.entries,
        }
    };

    let mut seen = HashSet::with_capacity(entries.len());
    Ok(entries.into_iter().filter(|entry| seen.insert(entry.id)).collect())
}
