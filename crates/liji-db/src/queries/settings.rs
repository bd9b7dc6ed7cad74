//! Key/value settings, including the shared password.

use liji_common::{Result, DEFAULT_PASSWORD};
use rusqlite::{Connection, OptionalExtension};

use super::db_err;

const PASSWORD_KEY: &str = "password";

/// Get a setting value by key.
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM settings WHERE key = ?", [key], |row| {
        row.get(0)
    })
    .optional()
    .map_err(db_err)
}

/// Insert or overwrite a setting.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (:key, :value)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::named_params! { ":key": key, ":value": value },
    )
    .map_err(db_err)?;
    Ok(())
}

/// Current shared password, falling back to the default if the row is gone.
pub fn get_password(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, PASSWORD_KEY)?.unwrap_or_else(|| DEFAULT_PASSWORD.to_string()))
}

/// Replace the shared password.
pub fn set_password(conn: &Connection, password: &str) -> Result<()> {
    set_setting(conn, PASSWORD_KEY, password)
}
