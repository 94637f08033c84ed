//! SQLite backend for the kudos reward store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The check-then-act operations
//! (`complete`, `record_attempt`, `purchase`) each run in a single immediate
//! transaction, so concurrent requests for the same learner can neither
//! double-award a completion nor overdraw a balance.

mod encode;
mod error;
mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
