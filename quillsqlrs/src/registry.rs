//! Table registry for a single statement.
//!
//! Callers name tables repeatedly (once per column, join or condition). The
//! registry collapses repeated references to one table and hands out
//! distinct aliases when the same base table is genuinely used twice.

use std::ops::Index;

use crate::error::{QueryError, Result};
use crate::sql_ast::{Table, TableId};

#[derive(Debug, Default, Clone)]
pub struct TableRegistry {
    tables: Vec<Table>,
}

enum Resolution {
    Reuse(TableId),
    Register { collisions: usize },
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a table request (`"users"`, `"users AS u"` or `"users u"`) to a
    /// registered table, registering a new one when nothing can be reused.
    pub fn resolve(&mut self, request: &str, is_root: bool) -> Result<TableId> {
        let mut candidate = match parse_table_request(request)? {
            (basename, Some(alias)) => Table::with_alias(basename, alias, is_root),
            (basename, None) => Table::new(basename, is_root),
        };

        let collisions = match self.check(&candidate)? {
            Resolution::Reuse(id) => {
                tracing::trace!(
                    request,
                    alias = %self.tables[id.0].alias,
                    "reusing registered table"
                );
                return Ok(id);
            }
            Resolution::Register { collisions } => collisions,
        };

        if collisions > 0 && !candidate.is_defined_alias {
            let alias = self.disambiguate(&candidate.basename, collisions);
            candidate.set_auto_alias(alias);
        }

        let id = TableId(self.tables.len());
        tracing::debug!(
            table = %candidate.basename,
            alias = %candidate.alias,
            is_root = candidate.is_root,
            collisions,
            "registered table"
        );
        self.tables.push(candidate);
        Ok(id)
    }

    fn check(&self, candidate: &Table) -> Result<Resolution> {
        if candidate.is_defined_alias {
            self.check_defined(candidate)
        } else {
            Ok(self.check_auto(candidate))
        }
    }

    fn check_auto(&self, candidate: &Table) -> Resolution {
        let mut collisions = 0;
        for (idx, table) in self.tables.iter().enumerate() {
            if !table.is_defined_alias && table.basename == candidate.basename {
                return Resolution::Reuse(TableId(idx));
            }
            if table.alias == candidate.basename {
                return Resolution::Reuse(TableId(idx));
            }
            if table.basename == candidate.basename {
                if table.is_root && candidate.is_root {
                    return Resolution::Reuse(TableId(idx));
                }
                collisions += 1;
            }
        }
        Resolution::Register { collisions }
    }

    fn check_defined(&self, candidate: &Table) -> Result<Resolution> {
        if let Some(id) = self.find_by_alias(&candidate.alias) {
            if self.tables[id.0].basename == candidate.basename {
                return Ok(Resolution::Reuse(id));
            }
            return Err(conflict(candidate));
        }
        for (idx, table) in self.tables.iter().enumerate() {
            if table.basename != candidate.basename {
                continue;
            }
            // Every select names the one FROM table, whatever alias it asks for.
            if table.is_root && candidate.is_root {
                return Ok(Resolution::Reuse(TableId(idx)));
            }
            // Aliasing off the root table is a self-join; a non-root table of
            // the same name cannot be told apart from the new one.
            if !table.is_root {
                return Err(conflict(candidate));
            }
        }
        Ok(Resolution::Register { collisions: 0 })
    }

    fn disambiguate(&self, basename: &str, collisions: usize) -> String {
        let mut counter = collisions;
        loop {
            let alias = format!("{basename}{counter}");
            if self.find_by_alias(&alias).is_none() {
                return alias;
            }
            counter += 1;
        }
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<TableId> {
        self.tables
            .iter()
            .position(|table| table.alias == alias)
            .map(TableId)
    }

    pub fn get(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableId, &Table)> {
        self.tables
            .iter()
            .enumerate()
            .map(|(idx, table)| (TableId(idx), table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Index<TableId> for TableRegistry {
    type Output = Table;

    fn index(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }
}

fn conflict(candidate: &Table) -> QueryError {
    QueryError::UnresolvableTableConflict {
        table: candidate.basename.clone(),
        alias: candidate.alias.clone(),
    }
}

/// Split a table request into its basename and optional explicit alias.
pub(crate) fn parse_table_request(request: &str) -> Result<(String, Option<String>)> {
    let parts: Vec<&str> = request.split_whitespace().collect();
    match parts.as_slice() {
        [name] if !name.eq_ignore_ascii_case("as") => Ok((name.to_string(), None)),
        [name, alias] if !alias.eq_ignore_ascii_case("as") => {
            Ok((name.to_string(), Some(alias.to_string())))
        }
        [name, keyword, alias] if keyword.eq_ignore_ascii_case("as") => {
            Ok((name.to_string(), Some(alias.to_string())))
        }
        _ => Err(QueryError::InvalidReference(format!(
            "malformed table reference '{request}'"
        ))),
    }
}
