//! Liji-DB: Database schema, migrations, and query operations
//!
//! This crate provides database functionality for liji using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use liji_db::pool::{get_conn, init_pool};
//! use liji_db::queries::records;
//!
//! let pool = init_pool("/app/data/liji.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let summary = records::save_records(&conn, &[]).unwrap();
//! println!("Deleted {} records", summary.deleted);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
