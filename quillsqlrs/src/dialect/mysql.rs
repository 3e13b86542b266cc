//! MySQL / MariaDB dialect.

use super::{render_json_literal, Dialect};

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn render_string(&self, value: &str) -> String {
        // Backslash is an escape character in MySQL string literals.
        let escaped = value.replace('\\', "\\\\").replace('\'', "''");
        format!("'{escaped}'")
    }

    fn render_literal(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::Bool(b) => u8::from(*b).to_string(),
            _ => render_json_literal(self, value),
        }
    }
}
