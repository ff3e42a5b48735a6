//! Persistent diary entries using redb.
//!
//! Each user has at most one entry per calendar date. Entries are stored
//! under `"{user_id:020}:{YYYY-MM-DD}"`, so a key range scan over one user's
//! prefix yields that user's entries in date order.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use redb::{Database, DatabaseError, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::recommend::RecommendationResult;

/// Table of diary entries keyed by user and date
const ENTRIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("diary_entries");

/// Date format used in keys and on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Recommendation saved alongside a diary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicSnapshot {
    pub result: RecommendationResult,
    pub saved_at: DateTime<Utc>,
}

/// A stored diary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: u64,
    pub date: NaiveDate,
    pub content: String,
    /// Dominant emotion label chosen for the day
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub music: Option<MusicSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when writing an entry
#[derive(Debug, Clone, Default)]
pub struct DiaryWrite {
    pub date: NaiveDate,
    pub content: String,
    /// Replaces the stored emotion; `None` clears it
    pub emotion: Option<String>,
    /// Replaces the stored music snapshot; `None` clears it
    pub music: Option<RecommendationResult>,
}

/// Errors that can occur during diary operations
#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Database creation error: {0}")]
    DatabaseCreation(#[from] DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a `YYYY-MM-DD` date, falling back to `today` when absent or invalid
pub fn resolve_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => today,
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_else(|e| {
            warn!(date = %s, error = %e, "Unparsable diary date, using today");
            today
        }),
    }
}

/// Diary persistence
pub trait DiaryStore: Send + Sync {
    /// Create or update the entry for `(user_id, write.date)`
    fn upsert(&self, user_id: u64, write: DiaryWrite) -> Result<DiaryEntry, DiaryError>;

    fn get(&self, user_id: u64, date: NaiveDate) -> Result<Option<DiaryEntry>, DiaryError>;

    /// Up to `limit` entries for a user, newest date first
    fn list(&self, user_id: u64, limit: usize) -> Result<Vec<DiaryEntry>, DiaryError>;

    /// Delete an entry, returning it if it existed
    fn remove(&self, user_id: u64, date: NaiveDate) -> Result<Option<DiaryEntry>, DiaryError>;
}

fn entry_key(user_id: u64, date: NaiveDate) -> String {
    format!("{user_id:020}:{}", date.format(DATE_FORMAT))
}

/// Half-open key range covering every entry of one user
fn user_range(user_id: u64) -> (String, String) {
    // ';' is the byte after ':'
    (format!("{user_id:020}:"), format!("{user_id:020};"))
}

fn encode(entry: &DiaryEntry) -> Result<Vec<u8>, DiaryError> {
    rmp_serde::to_vec_named(entry).map_err(|e| DiaryError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<DiaryEntry, DiaryError> {
    rmp_serde::from_slice(bytes).map_err(|e| DiaryError::Serialization(e.to_string()))
}

/// redb-backed diary store
pub struct RedbDiaryStore {
    db: Database,
}

impl RedbDiaryStore {
    /// Create or open the diary database
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, DiaryError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(db_path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit()?;

        info!(db_path = %db_path.display(), "Diary store initialized");

        Ok(Self { db })
    }
}

impl DiaryStore for RedbDiaryStore {
    fn upsert(&self, user_id: u64, write: DiaryWrite) -> Result<DiaryEntry, DiaryError> {
        let key = entry_key(user_id, write.date);
        let now = Utc::now();

        let write_txn = self.db.begin_write()?;
        let entry = {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;

            let existing = match table.get(key.as_str())? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };

            let music = write.music.map(|result| MusicSnapshot {
                result,
                saved_at: now,
            });

            let entry = match existing {
                Some(previous) => DiaryEntry {
                    content: write.content,
                    emotion: write.emotion,
                    music,
                    updated_at: now,
                    ..previous
                },
                None => DiaryEntry {
                    id: Uuid::new_v4(),
                    user_id,
                    date: write.date,
                    content: write.content,
                    emotion: write.emotion,
                    music,
                    created_at: now,
                    updated_at: now,
                },
            };

            let data = encode(&entry)?;
            table.insert(key.as_str(), data.as_slice())?;
            entry
        };
        write_txn.commit()?;

        debug!(user_id, date = %entry.date, id = %entry.id, "Diary entry saved");
        Ok(entry)
    }

    fn get(&self, user_id: u64, date: NaiveDate) -> Result<Option<DiaryEntry>, DiaryError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;

        match table.get(entry_key(user_id, date).as_str())? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn list(&self, user_id: u64, limit: usize) -> Result<Vec<DiaryEntry>, DiaryError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;
        let (start, end) = user_range(user_id);

        let mut entries = Vec::new();
        for item in table.range(start.as_str()..end.as_str())?.rev().take(limit) {
            let (_, value) = item?;
            entries.push(decode(value.value())?);
        }

        Ok(entries)
    }

    fn remove(&self, user_id: u64, date: NaiveDate) -> Result<Option<DiaryEntry>, DiaryError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ENTRIES_TABLE)?;
            let removed = table.remove(entry_key(user_id, date).as_str())?;
            match removed {
                Some(data) => Some(decode(data.value())?),
                None => None,
            }
        };
        write_txn.commit()?;

        if removed.is_some() {
            debug!(user_id, date = %date, "Diary entry removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SeedSet;
    use crate::features::FeatureTarget;
    use tempfile::TempDir;

    fn create_test_store() -> (RedbDiaryStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = RedbDiaryStore::new(temp_dir.path().join("diary.redb")).unwrap();
        (store, temp_dir)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn write(day: &str, content: &str) -> DiaryWrite {
        DiaryWrite {
            date: date(day),
            content: content.to_string(),
            ..Default::default()
        }
    }

    fn empty_result() -> RecommendationResult {
        RecommendationResult {
            target: FeatureTarget::from_fn(|f| f.midpoint()),
            seeds: SeedSet::default(),
            tracks: Vec::new(),
            total: 0,
        }
    }

    #[test]
    fn test_resolve_date() {
        let today = date("2024-05-01");
        assert_eq!(resolve_date(None, today), today);
        assert_eq!(resolve_date(Some(""), today), today);
        assert_eq!(resolve_date(Some("not-a-date"), today), today);
        assert_eq!(resolve_date(Some("2023-12-31"), today), date("2023-12-31"));
    }

    #[test]
    fn test_upsert_and_get() {
        let (store, _temp) = create_test_store();

        let created = store.upsert(7, write("2024-03-10", "first")).unwrap();
        let fetched = store.get(7, date("2024-03-10")).unwrap().unwrap();
        assert_eq!(created, fetched);
        assert!(store.get(8, date("2024-03-10")).unwrap().is_none());
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let (store, _temp) = create_test_store();

        let mut first = write("2024-03-10", "first");
        first.emotion = Some("joy".to_string());
        first.music = Some(empty_result());
        let created = store.upsert(7, first).unwrap();

        let mut second = write("2024-03-10", "second");
        second.emotion = Some("relief".to_string());
        let updated = store.upsert(7, second).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.content, "second");
        assert_eq!(updated.emotion.as_deref(), Some("relief"));
        // Every field is replaced, so an omitted snapshot is cleared
        assert!(updated.music.is_none());

        let cleared = store.upsert(7, write("2024-03-10", "third")).unwrap();
        assert_eq!(cleared.emotion, None);
        assert_eq!(store.get(7, cleared.date).unwrap(), Some(cleared));

        assert_eq!(store.list(7, 30).unwrap().len(), 1);
    }

    #[test]
    fn test_new_fails_when_parent_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let result = RedbDiaryStore::new(blocker.join("diary.redb"));
        assert!(matches!(result, Err(DiaryError::Io(_))));
    }

    #[test]
    fn test_list_newest_first_and_limited() {
        let (store, _temp) = create_test_store();

        for day in ["2024-01-05", "2024-03-01", "2023-12-25", "2024-02-14"] {
            store.upsert(1, write(day, day)).unwrap();
        }
        store.upsert(2, write("2024-06-01", "other user")).unwrap();

        let dates: Vec<_> = store
            .list(1, 3)
            .unwrap()
            .into_iter()
            .map(|e| e.date.format(DATE_FORMAT).to_string())
            .collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-14", "2024-01-05"]);
    }

    #[test]
    fn test_remove() {
        let (store, _temp) = create_test_store();
        store.upsert(3, write("2024-04-01", "gone soon")).unwrap();

        let removed = store.remove(3, date("2024-04-01")).unwrap().unwrap();
        assert_eq!(removed.content, "gone soon");
        assert!(store.get(3, date("2024-04-01")).unwrap().is_none());
        assert!(store.remove(3, date("2024-04-01")).unwrap().is_none());
    }

    #[test]
    fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("diary.redb");

        {
            let store = RedbDiaryStore::new(&path).unwrap();
            store.upsert(9, write("2024-05-05", "persisted")).unwrap();
        }

        let store = RedbDiaryStore::new(&path).unwrap();
        let entry = store.get(9, date("2024-05-05")).unwrap().unwrap();
        assert_eq!(entry.content, "persisted");
    }
}
