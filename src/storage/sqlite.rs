use super::LedgerStore;
use crate::config::StorageBackend;
use liji_common::Result;
use liji_db::models::{Giftbook, GiftbookInput, Record, RecordInput, SaveSummary};
use liji_db::pool::{get_conn, init_memory_pool, init_pool, DbPool};
use liji_db::queries::{giftbooks, records, settings};

/// SQLite-backed store. Batch saves are reconciled in a single transaction.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (and migrate) the database file at `db_path`.
    pub fn open(db_path: &str) -> Result<Self> {
        Ok(Self::new(init_pool(db_path)?))
    }

    /// Store backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(init_memory_pool()?))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl LedgerStore for SqliteStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }

    fn ping(&self) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| liji_common::Error::database(e.to_string()))
    }

    fn read_password(&self) -> Result<String> {
        let conn = get_conn(&self.pool)?;
        settings::get_password(&conn)
    }

    fn write_password(&self, password: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        settings::set_password(&conn, password)
    }

    fn list_records(&self) -> Result<Vec<Record>> {
        let conn = get_conn(&self.pool)?;
        records::list_records(&conn)
    }

    fn save_records(&self, input: &[RecordInput]) -> Result<SaveSummary> {
        let conn = get_conn(&self.pool)?;
        records::save_records(&conn, input)
    }

    fn list_giftbooks(&self) -> Result<Vec<Giftbook>> {
        let conn = get_conn(&self.pool)?;
        giftbooks::list_giftbooks(&conn)
    }

    fn save_giftbooks(&self, input: &[GiftbookInput]) -> Result<SaveSummary> {
        let conn = get_conn(&self.pool)?;
        giftbooks::save_giftbooks(&conn, input)
    }
}
