//! Unquoted dialect: identifiers are emitted exactly as requested.

use super::Dialect;

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainDialect;

impl Dialect for PlainDialect {
    fn quote_ident(&self, ident: &str) -> String {
        ident.to_string()
    }
}
