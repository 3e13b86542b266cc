//! Integration tests for grammar rendering.
//!
//! These tests drive the GrammarRenderer over hand-built statement parts.

use quillsql::dialect::{AnsiDialect, Dialect, MySqlDialect, PlainDialect};
use quillsql::grammar::{GrammarRenderer, QualifyColumns, StatementParts};
use quillsql::registry::TableRegistry;
use quillsql::sql_ast::{
    Chain, Column, Condition, GrammarStep, Joint, Operation, Operator, SelectOptions, TableId,
};
use serde_json::json;

fn simple(
    chain: Chain,
    table: TableId,
    name: &str,
    operator: Operator,
    value: serde_json::Value,
) -> Condition {
    Condition::Simple {
        chain,
        column: Column::new(name, None, table),
        operator,
        value,
    }
}

struct Statement {
    operation: Operation,
    tables: TableRegistry,
    base: TableId,
    columns: Vec<Column>,
    joints: Vec<Joint>,
    conditions: Vec<Condition>,
    group_by: Option<Column>,
}

impl Statement {
    fn orders_with_customers() -> Self {
        let mut tables = TableRegistry::new();
        let orders = tables.resolve("orders", true).unwrap();
        let customers = tables.resolve("customers AS c", false).unwrap();
        Self {
            operation: Operation::Select(SelectOptions::default()),
            base: orders,
            columns: vec![
                Column::new("id", None, orders),
                Column::new("name", Some("customer".to_string()), customers),
            ],
            joints: vec![Joint {
                table: customers,
                left: Column::new("customer_id", None, orders),
                right: Column::new("id", None, customers),
            }],
            conditions: vec![
                simple(Chain::And, orders, "status", Operator::In, json!(["paid", "shipped"])),
                Condition::Complex {
                    chain: Chain::Or,
                    conditions: vec![
                        simple(Chain::And, customers, "vip", Operator::Eq, json!(true)),
                        simple(Chain::And, orders, "refunded_at", Operator::IsNot, json!(null)),
                    ],
                },
            ],
            group_by: None,
            tables,
        }
    }

    fn parts(&self) -> StatementParts<'_> {
        StatementParts {
            operation: &self.operation,
            base: Some(self.base),
            columns: &self.columns,
            joints: &self.joints,
            conditions: &self.conditions,
            group_by: self.group_by.as_ref(),
            tables: &self.tables,
        }
    }
}

#[test]
fn renders_full_select_in_grammar_order() {
    let statement = Statement::orders_with_customers();
    let sql = GrammarRenderer::new(&PlainDialect, QualifyColumns::Auto).render(&statement.parts());
    assert_eq!(
        sql,
        "SELECT orders.id, c.name AS customer FROM orders \
         JOIN customers AS c ON orders.customer_id = c.id \
         WHERE orders.status IN ('paid', 'shipped') \
         OR (c.vip = true AND orders.refunded_at IS NOT NULL)"
    );
}

#[test]
fn renders_individual_steps() {
    let mut statement = Statement::orders_with_customers();
    statement.group_by = Some(Column::new("country", None, statement.base));
    let renderer = GrammarRenderer::new(&AnsiDialect, QualifyColumns::Auto);
    let parts = statement.parts();

    assert_eq!(
        renderer.render_step(GrammarStep::From, &parts),
        r#" FROM "orders""#
    );
    assert_eq!(
        renderer.render_step(GrammarStep::Joints, &parts),
        r#" JOIN "customers" AS "c" ON "orders"."customer_id" = "c"."id""#
    );
    assert_eq!(
        renderer.render_step(GrammarStep::GroupBy, &parts),
        r#" GROUP BY "orders"."country""#
    );
}

#[test]
fn absent_parts_render_empty_fragments() {
    let mut tables = TableRegistry::new();
    let base = tables.resolve("events", true).unwrap();
    let operation = Operation::Select(SelectOptions { distinct: true });
    let parts = StatementParts {
        operation: &operation,
        base: Some(base),
        columns: &[],
        joints: &[],
        conditions: &[Condition::Complex {
            chain: Chain::And,
            conditions: Vec::new(),
        }],
        group_by: None,
        tables: &tables,
    };
    let renderer = GrammarRenderer::new(&PlainDialect, QualifyColumns::Auto);

    assert_eq!(renderer.render_step(GrammarStep::Columns, &parts), " *");
    assert_eq!(renderer.render_step(GrammarStep::Where, &parts), "");
    assert_eq!(renderer.render_step(GrammarStep::GroupBy, &parts), "");
    assert_eq!(renderer.render(&parts), "SELECT DISTINCT * FROM events");
}

#[test]
fn expressions_are_not_quoted() {
    let mut tables = TableRegistry::new();
    let base = tables.resolve("orders", true).unwrap();
    let operation = Operation::Select(SelectOptions::default());
    let columns = [
        Column::new("COUNT(*)", Some("n".to_string()), base),
        Column::new("region", None, base),
    ];
    let parts = StatementParts {
        operation: &operation,
        base: Some(base),
        columns: &columns,
        joints: &[],
        conditions: &[],
        group_by: None,
        tables: &tables,
    };

    let sql = GrammarRenderer::new(&MySqlDialect, QualifyColumns::Always).render(&parts);
    assert_eq!(sql, "SELECT COUNT(*) AS `n`, `orders`.`region` FROM `orders`");
}

#[test]
fn dialects_escape_identifiers_and_strings() {
    assert_eq!(AnsiDialect.quote_ident(r#"we"ird"#), r#""we""ird""#);
    assert_eq!(MySqlDialect.quote_ident("we`ird"), "`we``ird`");
    assert_eq!(PlainDialect.quote_ident("users"), "users");

    assert_eq!(PlainDialect.render_literal(&json!("it's")), "'it''s'");
    assert_eq!(MySqlDialect.render_literal(&json!(r"a\b")), r"'a\\b'");
    assert_eq!(MySqlDialect.render_literal(&json!(false)), "0");
    assert_eq!(
        MySqlDialect.render_literal(&json!([true, r"a\b", null, 2])),
        r"1, 'a\\b', NULL, 2"
    );
    assert_eq!(AnsiDialect.render_literal(&json!([1, "x", null])), "1, 'x', NULL");
}
