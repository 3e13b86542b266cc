//! Fluent SQL statement builder.
//!
//! Tables named across `select`, `join`, `where_` and `group_by` calls are
//! resolved through a per-statement [`registry::TableRegistry`] that reuses
//! repeated references and aliases genuine self-joins. The accumulated
//! statement is rendered by the [`grammar`] pipeline of its operation.

pub mod backends;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod grammar;
pub mod query_builder;
pub mod registry;
pub mod sql_ast;

pub use config::QuillConfig;
pub use dialect::{AnsiDialect, Dialect, DialectKind, MySqlDialect, PlainDialect};
pub use error::{QueryError, Result};
pub use executor::{ColumnMeta, QueryExecutor, QueryResult};
pub use grammar::QualifyColumns;
pub use query_builder::{ColumnSpec, ConditionGroup, Query};
pub use sql_ast::Operator;

#[cfg(feature = "duckdb")]
pub use backends::DuckDbExecutor;
