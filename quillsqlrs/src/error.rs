use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot perform {requested} on a {current} statement")]
    OperationConflict { current: String, requested: String },
    #[error("no operation defined; call select before generating sql")]
    NoOperation,
    #[error("cannot resolve column {column}: no base table has been selected")]
    MissingBaseTable { column: String },
    #[error("two different columns requested with the same alias {alias}")]
    DuplicateColumnAlias { alias: String },
    #[error("table {table} cannot be registered under alias {alias}")]
    UnresolvableTableConflict { table: String, alias: String },
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("invalid operator: {0}")]
    InvalidOperator(String),
    #[error("no executor attached to this query")]
    NoExecutor,
    #[error("execution error: {0}")]
    Execution(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
