use crate::error::{QueryError, Result};
use crate::registry::TableRegistry;
use crate::sql_ast::{Column, TableId};

/// A requested select-list entry: a bare column name, or an alias bound to
/// an underlying column or expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    Bare(String),
    Aliased { alias: String, name: String },
}

impl ColumnSpec {
    pub fn bare(name: impl Into<String>) -> Self {
        ColumnSpec::Bare(name.into())
    }

    pub fn aliased(alias: impl Into<String>, name: impl Into<String>) -> Self {
        ColumnSpec::Aliased {
            alias: alias.into(),
            name: name.into(),
        }
    }

    fn into_parts(self) -> (String, Option<String>) {
        match self {
            ColumnSpec::Bare(name) => (name, None),
            ColumnSpec::Aliased { alias, name } => (name, Some(alias)),
        }
    }
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::bare(name)
    }
}

impl From<String> for ColumnSpec {
    fn from(name: String) -> Self {
        ColumnSpec::Bare(name)
    }
}

/// `(alias, column)`
impl From<(&str, &str)> for ColumnSpec {
    fn from((alias, name): (&str, &str)) -> Self {
        ColumnSpec::aliased(alias, name)
    }
}

impl From<(String, String)> for ColumnSpec {
    fn from((alias, name): (String, String)) -> Self {
        ColumnSpec::Aliased { alias, name }
    }
}

/// Register one select-list column on `table`.
///
/// Selecting the same column of the same table again is a no-op. Reusing an
/// alias for a different column is an error.
pub(crate) fn add_column(
    columns: &mut Vec<Column>,
    tables: &TableRegistry,
    table: TableId,
    spec: ColumnSpec,
) -> Result<()> {
    let (name, alias) = spec.into_parts();
    if name.trim().is_empty() {
        return Err(QueryError::InvalidReference(
            "empty column name in select list".to_string(),
        ));
    }

    if columns
        .iter()
        .any(|existing| existing.table == table && existing.name == name)
    {
        tracing::debug!(
            table = %tables[table].alias,
            column = %name,
            "column already selected, skipping"
        );
        return Ok(());
    }

    if let Some(alias) = &alias {
        if columns
            .iter()
            .any(|existing| existing.alias.as_deref() == Some(alias.as_str()))
        {
            return Err(QueryError::DuplicateColumnAlias {
                alias: alias.clone(),
            });
        }
    }

    columns.push(Column::new(name, alias, table));
    Ok(())
}
