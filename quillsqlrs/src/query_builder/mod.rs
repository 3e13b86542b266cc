//! Fluent statement builder.
//!
//! A [`Query`] owns all state for one statement: its operation, the table
//! registry, the select list, joins, filters and the group-by column. Every
//! fallible call returns `Result<&mut Query>` so chains read
//! `query.select(..)?.join(..)?.where_(..)?`.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::config::QuillConfig;
use crate::dialect::{Dialect, DialectKind};
use crate::error::{QueryError, Result};
use crate::executor::{QueryExecutor, QueryResult};
use crate::grammar::{GrammarRenderer, QualifyColumns, StatementParts};
use crate::registry::TableRegistry;
use crate::sql_ast::{
    Chain, Column, Condition, IntoOperator, Joint, Operation, Operator, SelectOptions, Table,
    TableId,
};

mod columns;
mod conditions;

pub use columns::ColumnSpec;
pub use conditions::ConditionGroup;

use columns::add_column;
use conditions::{add_complex, resolve_column_ref};

pub struct Query {
    operation: Option<Operation>,
    base: Option<TableId>,
    columns: Vec<Column>,
    joints: Vec<Joint>,
    conditions: Vec<Condition>,
    group_by: Option<Column>,
    tables: TableRegistry,
    dialect: Arc<dyn Dialect + Send + Sync>,
    qualify: QualifyColumns,
    executor: Option<Arc<dyn QueryExecutor>>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    pub fn new() -> Self {
        Self {
            operation: None,
            base: None,
            columns: Vec::new(),
            joints: Vec::new(),
            conditions: Vec::new(),
            group_by: None,
            tables: TableRegistry::new(),
            dialect: DialectKind::default().build(),
            qualify: QualifyColumns::default(),
            executor: None,
        }
    }

    /// Start a query with the dialect and qualification policy from `config`.
    pub fn from_config(config: &QuillConfig) -> Self {
        Self::new()
            .with_dialect(config.builder.dialect.build())
            .with_qualify(config.builder.qualify_columns)
    }

    /// Attach the executor used by [`Query::get`]. The executor's dialect
    /// replaces the current one; call [`Query::with_dialect`] afterwards to
    /// override it.
    pub fn with_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.dialect = executor.dialect().build();
        self.executor = Some(executor);
        self
    }

    pub fn with_dialect(mut self, dialect: Arc<dyn Dialect + Send + Sync>) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_qualify(mut self, qualify: QualifyColumns) -> Self {
        self.qualify = qualify;
        self
    }

    pub fn select<I, C>(&mut self, table: &str, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnSpec>,
    {
        self.select_with(table, columns, false)
    }

    /// Select every column (`*`) of `table`.
    pub fn select_all(&mut self, table: &str) -> Result<&mut Self> {
        self.select_with(table, std::iter::empty::<ColumnSpec>(), false)
    }

    pub fn select_distinct<I, C>(&mut self, table: &str, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnSpec>,
    {
        self.select_with(table, columns, true)
    }

    /// Add `columns` of `table` to the select list. The first call fixes the
    /// operation and the base table; later calls must agree on `distinct`.
    pub fn select_with<I, C>(
        &mut self,
        table: &str,
        columns: I,
        distinct: bool,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnSpec>,
    {
        let requested = Operation::Select(SelectOptions { distinct });
        if let Some(current) = &self.operation {
            if *current != requested {
                return Err(QueryError::OperationConflict {
                    current: current.to_string(),
                    requested: requested.to_string(),
                });
            }
        }

        let table = self.tables.resolve(table, true)?;
        if self.operation.is_none() {
            self.set_operation(requested)?;
            self.base = Some(table);
        }
        for spec in columns {
            add_column(&mut self.columns, &self.tables, table, spec.into())?;
        }
        Ok(self)
    }

    pub fn where_<O, V>(&mut self, column: &str, operator: O, value: V) -> Result<&mut Self>
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.filters().where_(column, operator, value)?;
        Ok(self)
    }

    pub fn and_where<O, V>(&mut self, column: &str, operator: O, value: V) -> Result<&mut Self>
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.where_(column, operator, value)
    }

    pub fn or_where<O, V>(&mut self, column: &str, operator: O, value: V) -> Result<&mut Self>
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.filters().or_where(column, operator, value)?;
        Ok(self)
    }

    pub fn where_eq<V: Into<Value>>(&mut self, column: &str, value: V) -> Result<&mut Self> {
        self.where_(column, Operator::Eq, value)
    }

    pub fn or_where_eq<V: Into<Value>>(&mut self, column: &str, value: V) -> Result<&mut Self> {
        self.or_where(column, Operator::Eq, value)
    }

    /// Open an AND-chained parenthesised group and return a handle on it.
    pub fn where_complex(&mut self) -> ConditionGroup<'_> {
        self.complex(Chain::And)
    }

    pub fn and_where_complex(&mut self) -> ConditionGroup<'_> {
        self.where_complex()
    }

    pub fn or_where_complex(&mut self) -> ConditionGroup<'_> {
        self.complex(Chain::Or)
    }

    pub fn join(&mut self, table: &str, left: &str, right: &str) -> Result<&mut Self> {
        let target = self.tables.resolve(table, false)?;
        let left = resolve_column_ref(&mut self.tables, self.base, left)?;
        let right = resolve_column_ref(&mut self.tables, self.base, right)?;
        self.joints.push(Joint {
            table: target,
            left,
            right,
        });
        Ok(self)
    }

    /// Group by `table.column`. Only one grouping column is kept; the last
    /// call wins.
    pub fn group_by(&mut self, table: &str, column: &str) -> Result<&mut Self> {
        let column = column.trim();
        if column.is_empty() {
            return Err(QueryError::InvalidReference(
                "empty group by column".to_string(),
            ));
        }
        let table = self.tables.resolve(table, false)?;
        self.group_by = Some(Column::new(column, None, table));
        Ok(self)
    }

    /// Render the statement to SQL text.
    pub fn generate(&self) -> Result<String> {
        let operation = self.operation.as_ref().ok_or(QueryError::NoOperation)?;
        let parts = StatementParts {
            operation,
            base: self.base,
            columns: &self.columns,
            joints: &self.joints,
            conditions: &self.conditions,
            group_by: self.group_by.as_ref(),
            tables: &self.tables,
        };
        let sql = GrammarRenderer::new(self.dialect.as_ref(), self.qualify).render(&parts);
        tracing::debug!(
            operation = operation.kind(),
            tables = self.tables.len(),
            sql = %sql,
            "generated statement"
        );
        Ok(sql)
    }

    /// Generate the statement and run it on the attached executor.
    pub async fn get(&self) -> Result<QueryResult> {
        let sql = self.generate()?;
        let executor = self.executor.as_ref().ok_or(QueryError::NoExecutor)?;
        let start = Instant::now();
        let result = executor.execute(&sql).await;
        tracing::debug!(
            ms = start.elapsed().as_millis(),
            ok = result.is_ok(),
            "executed statement"
        );
        result
    }

    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    pub fn base_table(&self) -> Option<&Table> {
        self.base.map(|id| &self.tables[id])
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn group_by_column(&self) -> Option<&Column> {
        self.group_by.as_ref()
    }

    fn set_operation(&mut self, operation: Operation) -> Result<()> {
        if let Some(current) = &self.operation {
            return Err(QueryError::OperationConflict {
                current: current.to_string(),
                requested: operation.to_string(),
            });
        }
        tracing::trace!(operation = %operation, "operation set");
        self.operation = Some(operation);
        Ok(())
    }

    fn filters(&mut self) -> ConditionGroup<'_> {
        ConditionGroup::new(&mut self.conditions, &mut self.tables, self.base)
    }

    fn complex(&mut self, chain: Chain) -> ConditionGroup<'_> {
        let nested = add_complex(&mut self.conditions, chain);
        ConditionGroup::new(nested, &mut self.tables, self.base)
    }
}
