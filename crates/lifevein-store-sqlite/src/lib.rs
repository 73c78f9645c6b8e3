//! SQLite-backed offline cache.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread pool without blocking the async runtime. The cache keeps whole
//! record lists under fixed keys; it is a snapshot for offline use, not a
//! queryable mirror of the remote store.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::LocalCache;
