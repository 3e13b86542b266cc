//! DuckDB backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use duckdb::types::Value as DuckValue;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};

use crate::config::ExecutorConfig;
use crate::dialect::DialectKind;
use crate::error::{QueryError, Result};
use crate::executor::{ColumnMeta, QueryExecutor, QueryResult};

/// Executes generated statements against a DuckDB database file (or
/// `:memory:`), keeping opened connections for reuse.
#[derive(Clone)]
pub struct DuckDbExecutor {
    database_path: PathBuf,
    limiter: Arc<Semaphore>,
    pool: Arc<Mutex<Vec<duckdb::Connection>>>,
}

impl DuckDbExecutor {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_config(path, &ExecutorConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(path: P, config: &ExecutorConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        tracing::info!(
            path = %path.display(),
            max_concurrency = config.max_concurrency,
            "creating DuckDB executor"
        );
        Self {
            database_path: path,
            limiter: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            pool: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn acquire_slot(&self) -> Result<SemaphorePermit<'_>> {
        if self.limiter.available_permits() == 0 {
            tracing::debug!("all DuckDB slots in use, waiting for permit");
        }
        self.limiter
            .acquire()
            .await
            .map_err(|e| QueryError::Execution(format!("limiter closed: {e}")))
    }

    async fn checkout_connection(&self) -> Result<duckdb::Connection> {
        if let Some(conn) = self.pool.lock().await.pop() {
            return Ok(conn);
        }
        tracing::debug!(path = %self.database_path.display(), "opening new DuckDB connection");
        duckdb::Connection::open(&self.database_path)
            .map_err(|e| QueryError::Execution(format!("open duckdb: {e}")))
    }
}

#[async_trait]
impl QueryExecutor for DuckDbExecutor {
    fn dialect(&self) -> DialectKind {
        DialectKind::Ansi
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult> {
        let sql = sql.to_string();
        let _permit = self.acquire_slot().await?;
        let conn = self.checkout_connection().await?;
        let (result, conn) = tokio::task::spawn_blocking(move || run_statement(conn, &sql))
            .await
            .map_err(|e| QueryError::Execution(format!("task join error: {e}")))??;
        self.pool.lock().await.push(conn);
        Ok(result)
    }
}

fn run_statement(
    conn: duckdb::Connection,
    sql: &str,
) -> Result<(QueryResult, duckdb::Connection)> {
    let start = Instant::now();
    let result = {
        let mut stmt = conn.prepare(sql)?;
        let mut rows_iter = stmt.query([])?;
        let names: Vec<String> = {
            let stmt_ref = rows_iter
                .as_ref()
                .ok_or_else(|| QueryError::Execution("statement missing".to_string()))?;
            (0..stmt_ref.column_count())
                .map(|idx| {
                    stmt_ref
                        .column_name(idx)
                        .map(|name| name.to_string())
                        .map_err(|e| QueryError::Execution(e.to_string()))
                })
                .collect::<Result<_>>()?
        };

        let mut rows = Vec::new();
        while let Some(row) = rows_iter.next()? {
            let mut map = Map::new();
            for (idx, name) in names.iter().enumerate() {
                map.insert(name.clone(), to_json(row.get_ref(idx)?.to_owned()));
            }
            rows.push(map);
        }
        QueryResult {
            columns: names.into_iter().map(|name| ColumnMeta { name }).collect(),
            rows,
        }
    };
    tracing::debug!(
        rows = result.rows.len(),
        columns = result.columns.len(),
        ms = start.elapsed().as_millis(),
        "duckdb execute"
    );
    Ok((result, conn))
}

fn to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::from(i),
        DuckValue::SmallInt(i) => Value::from(i),
        DuckValue::Int(i) => Value::from(i),
        DuckValue::BigInt(i) => Value::from(i),
        DuckValue::UTinyInt(i) => Value::from(i),
        DuckValue::USmallInt(i) => Value::from(i),
        DuckValue::UInt(i) => Value::from(i),
        DuckValue::UBigInt(i) => Value::from(i),
        DuckValue::Float(f) => Value::from(f),
        DuckValue::Double(f) => Value::from(f),
        DuckValue::Date32(d) => Value::from(d),
        DuckValue::HugeInt(i) => Value::String(i.to_string()),
        DuckValue::Decimal(d) => Value::String(d.to_string()),
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::String(s),
        DuckValue::Blob(bytes) => Value::String(hex::encode(bytes)),
        DuckValue::Timestamp(unit, t) | DuckValue::Time64(unit, t) => {
            Value::String(format!("{t} ({unit:?})"))
        }
        DuckValue::Interval {
            months,
            days,
            nanos,
        } => Value::String(format!("{months} months {days} days {nanos} nanos")),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::Array(items.into_iter().map(to_json).collect())
        }
        DuckValue::Struct(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, val)| (key.clone(), to_json(val.clone())))
                .collect(),
        ),
        DuckValue::Map(entries) => Value::Array(
            entries
                .iter()
                .map(|(k, v)| Value::Array(vec![to_json(k.clone()), to_json(v.clone())]))
                .collect(),
        ),
        DuckValue::Union(inner) => to_json(*inner),
    }
}
