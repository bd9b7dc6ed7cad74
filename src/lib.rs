//! Liji - gift ledger service
//!
//! This library crate exposes the server, configuration and storage layers
//! for integration testing.

pub mod config;
pub mod server;
pub mod storage;
