//! Storage backends for the ledger API.
//!
//! The router talks to a [`LedgerStore`] trait object. Two implementations
//! exist: [`SqliteStore`] reconciles batch saves inside a transaction, and
//! [`JsonFileStore`] rewrites whole JSON files.

mod files;
mod sqlite;

pub use files::JsonFileStore;
pub use sqlite::SqliteStore;

use crate::config::{StorageBackend, StorageConfig};
use anyhow::{Context, Result};
use liji_db::models::{Giftbook, GiftbookInput, Record, RecordInput, SaveSummary};
use std::sync::Arc;

/// Persistence operations behind the HTTP API.
pub trait LedgerStore: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> StorageBackend;

    /// Check that the underlying storage is reachable.
    fn ping(&self) -> liji_common::Result<()>;

    /// Current shared password.
    fn read_password(&self) -> liji_common::Result<String>;

    /// Replace the shared password.
    fn write_password(&self, password: &str) -> liji_common::Result<()>;

    fn list_records(&self) -> liji_common::Result<Vec<Record>>;

    /// Make the stored records equal to `records`.
    fn save_records(&self, records: &[RecordInput]) -> liji_common::Result<SaveSummary>;

    fn list_giftbooks(&self) -> liji_common::Result<Vec<Giftbook>>;

    /// Make the stored giftbooks (and their items) equal to `giftbooks`.
    fn save_giftbooks(&self, giftbooks: &[GiftbookInput]) -> liji_common::Result<SaveSummary>;
}

/// Open the configured backend, creating the data directory if needed.
pub fn open(config: &StorageConfig) -> Result<Arc<dyn LedgerStore>> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", config.data_dir))?;

    let store: Arc<dyn LedgerStore> = match config.backend {
        StorageBackend::Sqlite => {
            let db_path = config.db_path();
            let db_path_str = db_path.to_string_lossy();
            tracing::info!("Initializing database at {}", db_path_str);
            Arc::new(SqliteStore::open(&db_path_str)?)
        }
        StorageBackend::Files => {
            tracing::info!("Using JSON file storage in {:?}", config.data_dir);
            Arc::new(JsonFileStore::new(&config.data_dir))
        }
    };

    Ok(store)
}
