//! JSON file storage.
//!
//! Each collection lives in one file in the data directory and is replaced
//! wholesale on every save. Writes go to `<file>.tmp` and are renamed over the
//! target, so readers see either the old or the new file. Writers inside this
//! process are serialized; nothing protects against a second process.

use super::LedgerStore;
use crate::config::StorageBackend;
use chrono::{DateTime, Utc};
use liji_common::{Error, GiftbookId, GiftbookItemId, RecordId, Result, DEFAULT_PASSWORD};
use liji_db::models::{Giftbook, GiftbookInput, GiftbookItem, Record, RecordInput, SaveSummary};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

const RECORDS_FILE: &str = "records.json";
const GIFTBOOKS_FILE: &str = "giftbooks.json";
const SETTINGS_FILE: &str = "settings.json";
const PASSWORD_KEY: &str = "password";

/// Store that keeps each collection in a JSON file.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn load_settings(&self) -> Result<BTreeMap<String, String>> {
        load(&self.path(SETTINGS_FILE))
    }
}

/// Read and deserialize `path`. A missing or empty file is an empty collection.
fn load<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(Error::Io(e)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::serialization(format!("{}: {}", path.display(), e)))
}

/// Serialize `value` and write it to `<path>.tmp`, then rename over `path`.
fn store<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Hands out ids above everything already in use.
struct IdAllocator {
    next: Option<i64>,
}

impl IdAllocator {
    fn above(used: impl IntoIterator<Item = i64>) -> Self {
        let max = used.into_iter().max().unwrap_or(0).max(0);
        Self {
            next: max.checked_add(1),
        }
    }

    /// Fails once the id space above the largest used id is exhausted.
    fn allocate(&mut self) -> Result<i64> {
        let id = self
            .next
            .ok_or_else(|| Error::invalid_input("No ids left above the largest id in use"))?;
        self.next = id.checked_add(1);
        Ok(id)
    }
}

/// Collapse repeated ids to one entry: the last submitted wins, in the
/// position of the first. Matches the upsert semantics of the sqlite store.
fn dedup_by_id<T>(rows: Vec<T>, id: impl Fn(&T) -> i64) -> Vec<T> {
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        match position.get(&id(&row)) {
            Some(&idx) => out[idx] = row,
            None => {
                position.insert(id(&row), out.len());
                out.push(row);
            }
        }
    }
    out
}

fn summarize(previous: &HashSet<i64>, saved: &[i64]) -> SaveSummary {
    let saved_set: HashSet<i64> = saved.iter().copied().collect();
    let updated = saved.iter().filter(|id| previous.contains(id)).count();
    SaveSummary {
        inserted: saved.len() - updated,
        updated,
        deleted: previous.difference(&saved_set).count(),
    }
}

impl LedgerStore for JsonFileStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Files
    }

    fn ping(&self) -> Result<()> {
        let meta = std::fs::metadata(&self.dir)?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(Error::internal(format!(
                "{} is not a directory",
                self.dir.display()
            )))
        }
    }

    fn read_password(&self) -> Result<String> {
        Ok(self
            .load_settings()?
            .remove(PASSWORD_KEY)
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()))
    }

    fn write_password(&self, password: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut settings = self.load_settings()?;
        settings.insert(PASSWORD_KEY.to_string(), password.to_string());
        store(&self.path(SETTINGS_FILE), &settings)
    }

    fn list_records(&self) -> Result<Vec<Record>> {
        load(&self.path(RECORDS_FILE))
    }

    fn save_records(&self, input: &[RecordInput]) -> Result<SaveSummary> {
        let _guard = self.write_lock.lock();
        let path = self.path(RECORDS_FILE);

        let previous: Vec<Record> = load(&path)?;
        let created: HashMap<RecordId, DateTime<Utc>> =
            previous.iter().map(|r| (r.id, r.created_at)).collect();
        let mut ids = IdAllocator::above(
            previous
                .iter()
                .map(|r| r.id.get())
                .chain(input.iter().filter_map(|r| r.record_id().map(RecordId::get))),
        );

        let now = Utc::now();
        let records = input
            .iter()
            .cloned()
            .map(|r| -> Result<Record> {
                let id = match r.record_id() {
                    Some(id) => id,
                    None => RecordId::from(ids.allocate()?),
                };
                let created_at = created.get(&id).copied().unwrap_or(now);
                Ok(r.into_record(id, created_at, now))
            })
            .collect::<Result<Vec<Record>>>()?;
        let records = dedup_by_id(records, |r| r.id.get());

        store(&path, &records)?;

        let previous_ids: HashSet<i64> = previous.iter().map(|r| r.id.get()).collect();
        let saved_ids: Vec<i64> = records.iter().map(|r| r.id.get()).collect();
        Ok(summarize(&previous_ids, &saved_ids))
    }

    fn list_giftbooks(&self) -> Result<Vec<Giftbook>> {
        load(&self.path(GIFTBOOKS_FILE))
    }

    fn save_giftbooks(&self, input: &[GiftbookInput]) -> Result<SaveSummary> {
        let _guard = self.write_lock.lock();
        let path = self.path(GIFTBOOKS_FILE);

        let previous: Vec<Giftbook> = load(&path)?;
        let created: HashMap<GiftbookId, DateTime<Utc>> =
            previous.iter().map(|b| (b.id, b.created_at)).collect();
        let mut book_ids = IdAllocator::above(
            previous
                .iter()
                .map(|b| b.id.get())
                .chain(input.iter().filter_map(|b| b.giftbook_id().map(GiftbookId::get))),
        );
        let mut item_ids = IdAllocator::above(
            previous
                .iter()
                .flat_map(|b| b.items.iter().map(|i| i.id.get())),
        );

        let now = Utc::now();
        let books = input
            .iter()
            .map(|b| -> Result<Giftbook> {
                let id = match b.giftbook_id() {
                    Some(id) => id,
                    None => GiftbookId::from(book_ids.allocate()?),
                };
                let items = b
                    .items
                    .iter()
                    .map(|item| -> Result<GiftbookItem> {
                        Ok(GiftbookItem {
                            id: GiftbookItemId::from(item_ids.allocate()?),
                            giftbook_id: id,
                            person_name: item.person_name.clone(),
                            amount: item.amount,
                            notes: item.notes.clone(),
                            created_at: now,
                        })
                    })
                    .collect::<Result<Vec<GiftbookItem>>>()?;

                Ok(Giftbook {
                    id,
                    name: b.name.clone(),
                    event_type: b.event_type.clone(),
                    event_date: b.event_date.clone(),
                    total_amount: b.total_amount,
                    total_count: b.total_count,
                    notes: b.notes.clone(),
                    created_at: created.get(&id).copied().unwrap_or(now),
                    updated_at: now,
                    items,
                })
            })
            .collect::<Result<Vec<Giftbook>>>()?;
        let books = dedup_by_id(books, |b| b.id.get());

        store(&path, &books)?;

        let previous_ids: HashSet<i64> = previous.iter().map(|b| b.id.get()).collect();
        let saved_ids: Vec<i64> = books.iter().map(|b| b.id.get()).collect();
        Ok(summarize(&previous_ids, &saved_ids))
    }
}
