//! Liji-Common: Shared types and error handling.
//!
//! This crate provides common functionality used across liji:
//!
//! - **Typed IDs**: Integer newtypes for records, giftbooks and giftbook items
//! - **Error Handling**: Common error type, result alias and HTTP status mapping
//!
//! # Examples
//!
//! ```
//! use liji_common::{Error, RecordId, Result};
//!
//! let id = RecordId::from(7);
//! assert_eq!(id.get(), 7);
//!
//! fn example() -> Result<()> {
//!     Err(Error::database("locked"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;

/// Password in effect until the owner sets a new one.
pub const DEFAULT_PASSWORD: &str = "admin";
