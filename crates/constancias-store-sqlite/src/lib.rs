//! SQLite backend for the Constancias certificate store.
//!
//! Wraps a single [`rusqlite::Connection`] owned by [`SqliteStore`]. All
//! access is synchronous; multi-statement writes run in one transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{MAX_ISSUE_ATTEMPTS, SqliteStore};
