//! Database connection pool management.
//!
//! This module provides connection pooling for SQLite using r2d2.
//! It handles pool initialization, connection customization, and running migrations.

use liji_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::time::Duration;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a writer waits for an open batch-save transaction before failing.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Per-connection setup: foreign keys (giftbook items cascade with their
/// giftbook) and the busy timeout.
fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)
}

/// Initialize a new database pool with the given file path.
///
/// This function will:
/// - Create the SQLite database file if it doesn't exist
/// - Set up connection pooling with r2d2
/// - Enable foreign key constraints and a busy timeout on all connections
/// - Run pending database migrations
///
/// # Example
///
/// ```no_run
/// use liji_db::pool::init_pool;
///
/// let pool = init_pool("/app/data/liji.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);

    build_pool(manager, 4)
}

/// Initialize an in-memory database pool for testing.
///
/// Every SQLite in-memory connection is its own database, so this pool holds
/// exactly one connection. The database will be lost when the pool is dropped.
///
/// # Example
///
/// ```
/// use liji_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(init_connection);

    build_pool(manager, 1)
}

fn build_pool(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool.
///
/// This is a convenience wrapper around `pool.get()` that converts the
/// r2d2 error into our common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn test_memory_pool_shares_one_database() {
        let pool = init_memory_pool().unwrap();
        {
            let conn = get_conn(&pool).unwrap();
            conn.execute("UPDATE settings SET value = 'x' WHERE key = 'password'", [])
                .unwrap();
        }

        let conn = get_conn(&pool).unwrap();
        let value: String = conn
            .query_row("SELECT value FROM settings WHERE key = 'password'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(value, "x");
    }

    #[test]
    fn test_file_pool_size() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_pool(&dir.path().join("liji.db").to_string_lossy()).unwrap();
        assert_eq!(pool.max_size(), 4);
    }

    #[test]
    fn test_connection_pragmas() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);

        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);
    }

    #[test]
    fn test_migrations_run_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='records'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_file_pool_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liji.db");
        let path_str = path.to_string_lossy();

        {
            let pool = init_pool(&path_str).unwrap();
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "UPDATE settings SET value = 'changed' WHERE key = 'password'",
                [],
            )
            .unwrap();
        }

        let pool = init_pool(&path_str).unwrap();
        let conn = get_conn(&pool).unwrap();
        let value: String = conn
            .query_row("SELECT value FROM settings WHERE key = 'password'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(value, "changed");
    }
}
