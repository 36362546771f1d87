//! SQLite backend for the GuessShot quiz store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. That thread owns the only
//! connection, so each store call runs to completion before the next one
//! starts.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod engine_tests;
