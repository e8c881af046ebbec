//! Core types and trait definitions for the Constancias certificate store.
//!
//! This crate is free of database dependencies. The SQLite backend and the
//! command-line frontend both depend on it; it depends on nothing of theirs.

pub mod code;
pub mod error;
pub mod record;
pub mod store;

pub use error::{ConstraintViolation, Entity, Error, Result};
