//! Grammar-driven SQL rendering.
//!
//! An [`Operation`] declares its base clause and an ordered list of
//! [`GrammarStep`]s. The renderer looks each step up in a static dispatch
//! table, hands it the slice of statement state it declares, and
//! concatenates the returned fragments. Every fragment starts with a space
//! (or is empty) so the pieces join without further bookkeeping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dialect::Dialect;
use crate::registry::TableRegistry;
use crate::sql_ast::{Column, Condition, GrammarStep, Joint, Operation, Operator, TableId};

/// When column references are prefixed with their table alias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualifyColumns {
    /// Qualify only when the statement references more than one table.
    #[default]
    Auto,
    Always,
    Never,
}

/// Borrowed view over the state accumulated by a statement builder.
#[derive(Debug, Clone, Copy)]
pub struct StatementParts<'a> {
    pub operation: &'a Operation,
    pub base: Option<TableId>,
    pub columns: &'a [Column],
    pub joints: &'a [Joint],
    pub conditions: &'a [Condition],
    pub group_by: Option<&'a Column>,
    pub tables: &'a TableRegistry,
}

pub struct GrammarRenderer<'d> {
    dialect: &'d dyn Dialect,
    qualify: QualifyColumns,
}

impl<'d> GrammarRenderer<'d> {
    pub fn new(dialect: &'d dyn Dialect, qualify: QualifyColumns) -> Self {
        Self { dialect, qualify }
    }

    pub fn render(&self, parts: &StatementParts<'_>) -> String {
        let mut sql = parts.operation.base_clause();
        for step in parts.operation.grammar() {
            sql.push_str(&self.render_step(*step, parts));
        }
        sql
    }

    pub fn render_step(&self, step: GrammarStep, parts: &StatementParts<'_>) -> String {
        let scope = self.scope(parts.tables);
        match step {
            GrammarStep::Columns => render_columns(&scope, parts.columns),
            GrammarStep::From => parts
                .base
                .map(|base| render_from(&scope, base))
                .unwrap_or_default(),
            GrammarStep::Joints => render_joints(&scope, parts.joints),
            GrammarStep::Where => render_where(&scope, parts.conditions),
            GrammarStep::GroupBy => parts
                .group_by
                .map(|column| render_group_by(&scope, column))
                .unwrap_or_default(),
        }
    }

    fn scope<'a>(&'a self, tables: &'a TableRegistry) -> RenderScope<'a> {
        let qualify = match self.qualify {
            QualifyColumns::Auto => tables.len() > 1,
            QualifyColumns::Always => true,
            QualifyColumns::Never => false,
        };
        RenderScope {
            dialect: self.dialect,
            tables,
            qualify,
        }
    }
}

/// Naming context shared by the steps of one render.
struct RenderScope<'a> {
    dialect: &'a dyn Dialect,
    tables: &'a TableRegistry,
    qualify: bool,
}

impl RenderScope<'_> {
    fn table_ref(&self, id: TableId) -> String {
        let table = &self.tables[id];
        let name = self.dialect.quote_ident(&table.basename);
        if table.needs_alias() {
            format!("{name} AS {}", self.dialect.quote_ident(&table.alias))
        } else {
            name
        }
    }

    fn column_ref(&self, column: &Column) -> String {
        self.column_ref_with(column, self.qualify)
    }

    fn column_ref_with(&self, column: &Column, qualify: bool) -> String {
        // `*` and raw expressions pass through untouched.
        if !is_plain_identifier(&column.name) {
            return column.name.clone();
        }
        if qualify {
            let table = &self.tables[column.table];
            self.dialect.qualify_column(&table.alias, &column.name)
        } else {
            self.dialect.quote_ident(&column.name)
        }
    }

    fn value(&self, operator: Operator, value: &Value) -> String {
        let rendered = self.dialect.render_literal(value);
        if operator.takes_list() {
            format!("({rendered})")
        } else {
            rendered
        }
    }
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn render_columns(scope: &RenderScope<'_>, columns: &[Column]) -> String {
    if columns.is_empty() {
        return " *".to_string();
    }
    let items: Vec<String> = columns
        .iter()
        .map(|column| {
            let expr = scope.column_ref(column);
            match &column.alias {
                Some(alias) => format!("{expr} AS {}", scope.dialect.quote_ident(alias)),
                None => expr,
            }
        })
        .collect();
    format!(" {}", items.join(", "))
}

fn render_from(scope: &RenderScope<'_>, base: TableId) -> String {
    format!(" FROM {}", scope.table_ref(base))
}

fn render_joints(scope: &RenderScope<'_>, joints: &[Joint]) -> String {
    joints
        .iter()
        .map(|joint| {
            format!(
                " JOIN {} ON {} = {}",
                scope.table_ref(joint.table),
                scope.column_ref(&joint.left),
                scope.column_ref(&joint.right)
            )
        })
        .collect()
}

fn render_where(scope: &RenderScope<'_>, conditions: &[Condition]) -> String {
    match render_condition_list(scope, conditions) {
        Some(filter) => format!(" WHERE {filter}"),
        None => String::new(),
    }
}

fn render_group_by(scope: &RenderScope<'_>, column: &Column) -> String {
    format!(" GROUP BY {}", scope.column_ref_with(column, true))
}

/// Render a condition list left to right. The chain of the first rendered
/// entry is dropped; empty groups render nothing.
fn render_condition_list(scope: &RenderScope<'_>, conditions: &[Condition]) -> Option<String> {
    let mut out = String::new();
    for condition in conditions {
        let Some(fragment) = render_condition(scope, condition) else {
            continue;
        };
        if !out.is_empty() {
            out.push(' ');
            out.push_str(condition.chain().keyword());
            out.push(' ');
        }
        out.push_str(&fragment);
    }
    (!out.is_empty()).then_some(out)
}

fn render_condition(scope: &RenderScope<'_>, condition: &Condition) -> Option<String> {
    match condition {
        Condition::Simple {
            column,
            operator,
            value,
            ..
        } => Some(format!(
            "{} {} {}",
            scope.column_ref(column),
            operator.as_sql(),
            scope.value(*operator, value)
        )),
        Condition::Complex { conditions, .. } => {
            render_condition_list(scope, conditions).map(|inner| format!("({inner})"))
        }
    }
}
