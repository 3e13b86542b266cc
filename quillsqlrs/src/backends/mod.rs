//! Database backends implementing [`crate::executor::QueryExecutor`].
//!
//! Each backend lives in its own file and is gated behind a feature flag.

#[cfg(feature = "duckdb")]
mod duckdb;
#[cfg(feature = "duckdb")]
pub use duckdb::DuckDbExecutor;
