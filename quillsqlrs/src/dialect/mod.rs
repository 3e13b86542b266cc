//! SQL dialect abstractions.
//!
//! Each dialect is implemented in its own file. The grammar renderer walks
//! the statement; the dialect only decides how identifiers and literal
//! values are spelled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Dialects render identifiers and literal values.
pub trait Dialect {
    fn quote_ident(&self, ident: &str) -> String;
    fn qualify_column(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.quote_ident(table), self.quote_ident(column))
    }
    fn render_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
    fn render_literal(&self, value: &serde_json::Value) -> String {
        render_json_literal(self, value)
    }
}

/// Shared literal spelling. Strings go through `render_string` and array
/// items back through `render_literal`, so dialect overrides apply to both.
pub fn render_json_literal<D: Dialect + ?Sized>(
    dialect: &D,
    value: &serde_json::Value,
) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => dialect.render_string(s),
        serde_json::Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(|v| dialect.render_literal(v)).collect();
            rendered.join(", ")
        }
        serde_json::Value::Object(_) => dialect.render_string(&value.to_string()),
    }
}

/// Dialect selection as it appears in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Plain,
    Ansi,
    #[serde(rename = "mysql")]
    MySql,
}

impl DialectKind {
    pub fn build(self) -> Arc<dyn Dialect + Send + Sync> {
        match self {
            DialectKind::Plain => Arc::new(PlainDialect),
            DialectKind::Ansi => Arc::new(AnsiDialect),
            DialectKind::MySql => Arc::new(MySqlDialect),
        }
    }
}

mod ansi;
mod mysql;
mod plain;

pub use ansi::AnsiDialect;
pub use mysql::MySqlDialect;
pub use plain::PlainDialect;
