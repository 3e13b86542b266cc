//! Execution seam between the statement builder and a database.
//!
//! The builder only produces SQL text; whatever runs it implements
//! [`QueryExecutor`] and is attached to a query with
//! [`crate::Query::with_executor`].

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::dialect::DialectKind;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Map<String, Value>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Dialect the generated SQL should be rendered in for this backend.
    fn dialect(&self) -> DialectKind {
        DialectKind::Plain
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult>;
}
