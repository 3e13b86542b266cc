use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{QueryError, Result};

/// Handle to a table owned by a [`crate::registry::TableRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub(crate) usize);

impl TableId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub basename: String,
    pub alias: String,
    pub is_root: bool,
    pub is_defined_alias: bool,
}

impl Table {
    /// A table that carries its auto-alias (the basename itself).
    pub fn new(basename: impl Into<String>, is_root: bool) -> Self {
        let basename = basename.into();
        Self {
            alias: basename.clone(),
            basename,
            is_root,
            is_defined_alias: false,
        }
    }

    pub fn with_alias(basename: impl Into<String>, alias: impl Into<String>, is_root: bool) -> Self {
        Self {
            basename: basename.into(),
            alias: alias.into(),
            is_root,
            is_defined_alias: true,
        }
    }

    /// True when the rendered table reference needs an `AS alias` suffix.
    pub fn needs_alias(&self) -> bool {
        self.alias != self.basename
    }

    pub(crate) fn set_auto_alias(&mut self, alias: String) {
        self.alias = alias;
        self.is_defined_alias = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub alias: Option<String>,
    pub table: TableId,
}

impl Column {
    pub fn new(name: impl Into<String>, alias: Option<String>, table: TableId) -> Self {
        Self {
            name: name.into(),
            alias,
            table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joint {
    pub table: TableId,
    pub left: Column,
    pub right: Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    And,
    Or,
}

impl Chain {
    pub fn keyword(self) -> &'static str {
        match self {
            Chain::And => "AND",
            Chain::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    In,
    NotIn,
    Is,
    IsNot,
}

impl Operator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
        }
    }

    /// Operators whose right-hand side renders as a parenthesised list.
    pub fn takes_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Neq,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "IS" => Operator::Is,
            "IS NOT" => Operator::IsNot,
            _ => return Err(QueryError::InvalidOperator(s.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Accepts either a typed [`Operator`] or its SQL spelling.
pub trait IntoOperator {
    fn into_operator(self) -> Result<Operator>;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Result<Operator> {
        Ok(self)
    }
}

impl IntoOperator for &str {
    fn into_operator(self) -> Result<Operator> {
        self.parse()
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Result<Operator> {
        self.parse()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Simple {
        chain: Chain,
        column: Column,
        operator: Operator,
        value: Value,
    },
    /// Parenthesised group; nested entries follow the same chaining rules.
    Complex {
        chain: Chain,
        conditions: Vec<Condition>,
    },
}

impl Condition {
    pub fn chain(&self) -> Chain {
        match self {
            Condition::Simple { chain, .. } | Condition::Complex { chain, .. } => *chain,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    pub distinct: bool,
}

/// One named fragment producer in an operation's rendering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarStep {
    Columns,
    From,
    Joints,
    Where,
    GroupBy,
}

const SELECT_GRAMMAR: &[GrammarStep] = &[
    GrammarStep::Columns,
    GrammarStep::From,
    GrammarStep::Joints,
    GrammarStep::Where,
    GrammarStep::GroupBy,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Select(SelectOptions),
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Select(_) => "select",
        }
    }

    /// Operation keyword plus its modifiers, e.g. `SELECT DISTINCT`.
    pub fn base_clause(&self) -> String {
        match self {
            Operation::Select(options) => {
                let mut base = "SELECT".to_string();
                if options.distinct {
                    base.push_str(" DISTINCT");
                }
                base
            }
        }
    }

    pub fn grammar(&self) -> &'static [GrammarStep] {
        match self {
            Operation::Select(_) => SELECT_GRAMMAR,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Select(SelectOptions { distinct: true }) => f.write_str("select distinct"),
            Operation::Select(_) => f.write_str("select"),
        }
    }
}
