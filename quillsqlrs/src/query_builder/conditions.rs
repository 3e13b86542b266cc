use serde_json::Value;

use crate::error::{QueryError, Result};
use crate::registry::TableRegistry;
use crate::sql_ast::{Chain, Column, Condition, IntoOperator, Operator, TableId};

/// Resolve `column` or `table.column` into a [`Column`]. Unqualified
/// references bind to the base table; qualified ones go through the
/// registry as non-root tables.
pub(crate) fn resolve_column_ref(
    tables: &mut TableRegistry,
    base: Option<TableId>,
    reference: &str,
) -> Result<Column> {
    match parse_column_ref(reference)? {
        (Some(table), column) => {
            let id = tables.resolve(table, false)?;
            Ok(Column::new(column, None, id))
        }
        (None, column) => {
            let base = base.ok_or_else(|| QueryError::MissingBaseTable {
                column: reference.to_string(),
            })?;
            Ok(Column::new(column, None, base))
        }
    }
}

fn parse_column_ref(reference: &str) -> Result<(Option<&str>, &str)> {
    let reference = reference.trim();
    let invalid = || QueryError::InvalidReference(format!("malformed column reference '{reference}'"));
    match reference.split_once('.') {
        Some((table, column)) => {
            let (table, column) = (table.trim(), column.trim());
            if table.is_empty() || column.is_empty() {
                return Err(invalid());
            }
            Ok((Some(table), column))
        }
        None if reference.is_empty() => Err(invalid()),
        None => Ok((None, reference)),
    }
}

pub(crate) fn add_simple(
    into: &mut Vec<Condition>,
    chain: Chain,
    column: Column,
    operator: Operator,
    value: Value,
) {
    into.push(Condition::Simple {
        chain,
        column,
        operator,
        value,
    });
}

/// Push an empty complex condition and return its nested list.
pub(crate) fn add_complex(into: &mut Vec<Condition>, chain: Chain) -> &mut Vec<Condition> {
    into.push(Condition::Complex {
        chain,
        conditions: Vec::new(),
    });
    match into.last_mut() {
        Some(Condition::Complex { conditions, .. }) => conditions,
        _ => unreachable!(),
    }
}

/// Live handle on one condition list: the statement's top-level filter or a
/// parenthesised group nested inside it.
pub struct ConditionGroup<'q> {
    conditions: &'q mut Vec<Condition>,
    tables: &'q mut TableRegistry,
    base: Option<TableId>,
}

impl<'q> ConditionGroup<'q> {
    pub(crate) fn new(
        conditions: &'q mut Vec<Condition>,
        tables: &'q mut TableRegistry,
        base: Option<TableId>,
    ) -> Self {
        Self {
            conditions,
            tables,
            base,
        }
    }

    pub fn where_<O, V>(&mut self, column: &str, operator: O, value: V) -> Result<&mut Self>
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.push_simple(Chain::And, column, operator, value)?;
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
        self.push_simple(Chain::Or, column, operator, value)?;
        Ok(self)
    }

    /// Equality shorthand for [`Self::where_`].
    pub fn where_eq<V: Into<Value>>(&mut self, column: &str, value: V) -> Result<&mut Self> {
        self.where_(column, Operator::Eq, value)
    }

    pub fn or_where_eq<V: Into<Value>>(&mut self, column: &str, value: V) -> Result<&mut Self> {
        self.or_where(column, Operator::Eq, value)
    }

    pub fn where_complex(&mut self) -> ConditionGroup<'_> {
        self.push_complex(Chain::And)
    }

    pub fn and_where_complex(&mut self) -> ConditionGroup<'_> {
        self.where_complex()
    }

    pub fn or_where_complex(&mut self) -> ConditionGroup<'_> {
        self.push_complex(Chain::Or)
    }

    pub fn conditions(&self) -> &[Condition] {
        self.conditions.as_slice()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn push_simple<O, V>(&mut self, chain: Chain, column: &str, operator: O, value: V) -> Result<()>
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        let operator = operator.into_operator()?;
        let column = resolve_column_ref(self.tables, self.base, column)?;
        add_simple(self.conditions, chain, column, operator, value.into());
        Ok(())
    }

    fn push_complex(&mut self, chain: Chain) -> ConditionGroup<'_> {
        let nested = add_complex(self.conditions, chain);
        ConditionGroup::new(nested, self.tables, self.base)
    }
}
