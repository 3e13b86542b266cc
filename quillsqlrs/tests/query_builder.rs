//! Integration tests for the fluent query builder.
//!
//! These tests exercise the public API: Query, ColumnSpec, ConditionGroup.

use std::sync::Arc;

use quillsql::{
    AnsiDialect, ColumnSpec, Operator, QualifyColumns, Query, QueryError, QuillConfig,
};
use serde_json::json;

// ============================================================================
// Rendering scenarios
// ============================================================================

#[test]
fn selects_columns_from_base_table() {
    let mut query = Query::new();
    query.select("users", ["id", "name"]).unwrap();
    assert_eq!(query.generate().unwrap(), "SELECT id, name FROM users");
}

#[test]
fn qualified_where_on_single_table_renders_bare_column() {
    let mut query = Query::new();
    query
        .select("users", ["id"])
        .unwrap()
        .where_("users.id", "=", 5)
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT id FROM users WHERE id = 5"
    );
}

#[test]
fn join_renders_after_from_clause() {
    let mut query = Query::new();
    query
        .select_all("users")
        .unwrap()
        .join("orders", "users.id", "orders.user_id")
        .unwrap();
    let sql = query.generate().unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM users JOIN orders ON users.id = orders.user_id"
    );
    assert!(sql.find("FROM users").unwrap() < sql.find("JOIN orders").unwrap());
}

#[test]
fn distinct_select_renders_modifier() {
    let mut query = Query::new();
    query.select_distinct("t", ["a"]).unwrap();
    let sql = query.generate().unwrap();
    assert!(sql.starts_with("SELECT DISTINCT"));
    assert_eq!(sql, "SELECT DISTINCT a FROM t");
}

#[test]
fn repeated_selects_on_same_table_collapse() {
    let mut query = Query::new();
    query.select("users", ["id"]).unwrap();
    query.select("users", ["name"]).unwrap();

    assert_eq!(query.tables().len(), 1);
    assert_eq!(query.generate().unwrap(), "SELECT id, name FROM users");
}

#[test]
fn complex_group_then_or_condition() {
    let mut query = Query::new();
    query.select("users", ["id"]).unwrap();
    query
        .where_complex()
        .where_("age", ">", 18)
        .unwrap()
        .where_eq("active", true)
        .unwrap();
    query.or_where_eq("role", "admin").unwrap();

    assert_eq!(
        query.generate().unwrap(),
        "SELECT id FROM users WHERE (age > 18 AND active = true) OR role = 'admin'"
    );
}

#[test]
fn nested_groups_render_recursively() {
    let mut query = Query::new();
    query.select("users", ["id"]).unwrap();
    query.where_eq("a", 1).unwrap();
    {
        let mut group = query.or_where_complex();
        group.where_eq("b", 2).unwrap();
        group
            .or_where_complex()
            .where_eq("c", 3)
            .unwrap()
            .where_eq("d", 4)
            .unwrap();
        assert_eq!(group.len(), 2);
    }
    query.and_where("e", "<=", 5).unwrap();

    assert_eq!(
        query.generate().unwrap(),
        "SELECT id FROM users WHERE a = 1 OR (b = 2 OR (c = 3 AND d = 4)) AND e <= 5"
    );
}

#[test]
fn first_condition_chain_is_not_rendered() {
    let mut query = Query::new();
    query.select("users", ["id"]).unwrap();
    query.or_where_eq("id", 1).unwrap();
    query.or_where_eq("id", 2).unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT id FROM users WHERE id = 1 OR id = 2"
    );
}

#[test]
fn empty_groups_are_skipped() {
    let mut query = Query::new();
    query.select_all("users").unwrap();
    query.where_complex();
    assert_eq!(query.generate().unwrap(), "SELECT * FROM users");

    query.or_where_eq("id", 7).unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT * FROM users WHERE id = 7"
    );
}

#[test]
fn list_null_and_string_values() {
    let mut query = Query::new();
    query
        .select("users", ["id"])
        .unwrap()
        .where_("id", "IN", vec![1, 2, 3])
        .unwrap()
        .where_("deleted_at", Operator::Is, serde_json::Value::Null)
        .unwrap()
        .where_("name", "not like", "O'Brien%")
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT id FROM users WHERE id IN (1, 2, 3) AND deleted_at IS NULL AND name NOT LIKE 'O''Brien%'"
    );
}

#[test]
fn json_values_render_as_literals() {
    let mut query = Query::new();
    query
        .select("products", ["sku"])
        .unwrap()
        .where_("price", ">=", json!(9.5))
        .unwrap()
        .where_("category", "NOT IN", json!(["toys", "games"]))
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT sku FROM products WHERE price >= 9.5 AND category NOT IN ('toys', 'games')"
    );
}

#[test]
fn aliased_columns_and_expressions() {
    let mut query = Query::new();
    query
        .select(
            "orders",
            [
                ColumnSpec::bare("customer_id"),
                ColumnSpec::aliased("total", "SUM(amount)"),
            ],
        )
        .unwrap()
        .group_by("orders", "customer_id")
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT customer_id, SUM(amount) AS total FROM orders GROUP BY orders.customer_id"
    );
}

#[test]
fn group_by_last_call_wins() {
    let mut query = Query::new();
    query.select("orders", ["status"]).unwrap();
    query.group_by("orders", "customer_id").unwrap();
    query.group_by("orders", "status").unwrap();

    assert_eq!(query.group_by_column().unwrap().name, "status");
    assert!(query.generate().unwrap().ends_with("GROUP BY orders.status"));
}

#[test]
fn self_join_off_base_table_gets_its_own_alias() {
    let mut query = Query::new();
    query
        .select("users", ["name"])
        .unwrap()
        .join("users AS m", "users.manager_id", "m.id")
        .unwrap()
        .select("users AS m", [("manager", "name")])
        .unwrap();

    assert_eq!(query.tables().len(), 2);
    assert_eq!(
        query.generate().unwrap(),
        "SELECT users.name, m.name AS manager FROM users JOIN users AS m ON users.manager_id = m.id"
    );
}

#[test]
fn declared_alias_is_usable_as_table_reference() {
    let mut query = Query::new();
    query
        .select("users AS u", ["id"])
        .unwrap()
        .where_("u.id", "=", 1)
        .unwrap();

    assert_eq!(query.tables().len(), 1);
    assert_eq!(
        query.generate().unwrap(),
        "SELECT id FROM users AS u WHERE id = 1"
    );
}

#[test]
fn second_alias_for_base_table_reuses_it() {
    let mut query = Query::new();
    query.select("users AS a", ["id"]).unwrap();
    query.select("users AS b", ["name"]).unwrap();

    assert_eq!(query.tables().len(), 1);
    assert_eq!(query.base_table().unwrap().alias, "a");
    assert_eq!(
        query.generate().unwrap(),
        "SELECT id, name FROM users AS a"
    );
}

#[test]
fn joins_unqualified_refs_bind_to_base_table() {
    let mut query = Query::new();
    query
        .select("orders", ["id"])
        .unwrap()
        .join("customers", "customer_id", "customers.id")
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT orders.id FROM orders JOIN customers ON orders.customer_id = customers.id"
    );
}

// ============================================================================
// Column registration
// ============================================================================

#[test]
fn same_column_is_registered_once() {
    let mut query = Query::new();
    query.select("users", ["id", "id"]).unwrap();
    query.select("users", [("user_id", "id")]).unwrap();
    assert_eq!(query.columns().len(), 1);
    assert_eq!(query.columns()[0].alias, None);
}

#[test]
fn alias_reused_for_different_column_fails() {
    let mut query = Query::new();
    query.select("users", [("label", "name")]).unwrap();
    let err = query.select("users", [("label", "email")]).err().unwrap();
    assert!(matches!(err, QueryError::DuplicateColumnAlias { alias } if alias == "label"));
}

#[test]
fn alias_reused_for_identical_column_is_fine() {
    let mut query = Query::new();
    query.select("users", [("label", "name")]).unwrap();
    query.select("users", [("label", "name")]).unwrap();
    assert_eq!(query.columns().len(), 1);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn generate_without_operation_fails() {
    let query = Query::new();
    assert!(matches!(query.generate(), Err(QueryError::NoOperation)));

    let mut joined_only = Query::new();
    joined_only.join("orders", "users.id", "orders.user_id").unwrap();
    assert!(matches!(joined_only.generate(), Err(QueryError::NoOperation)));
}

#[test]
fn operation_is_fixed_after_first_select() {
    let mut query = Query::new();
    query.select("users", ["id"]).unwrap();
    let err = query.select_distinct("users", ["name"]).err().unwrap();
    assert!(matches!(
        err,
        QueryError::OperationConflict { ref current, ref requested }
            if current == "select" && requested == "select distinct"
    ));
    assert_eq!(query.columns().len(), 1);
    assert_eq!(query.generate().unwrap(), "SELECT id FROM users");
}

#[test]
fn unqualified_reference_without_base_fails() {
    let mut query = Query::new();
    let err = query.where_eq("id", 1).err().unwrap();
    assert!(matches!(err, QueryError::MissingBaseTable { column } if column == "id"));

    let err = query.where_complex().where_eq("id", 1).err().unwrap();
    assert!(matches!(err, QueryError::MissingBaseTable { .. }));
}

#[test]
fn unknown_operator_fails() {
    let mut query = Query::new();
    query.select("users", ["id"]).unwrap();
    let err = query.where_("id", "=~", 1).err().unwrap();
    assert!(matches!(err, QueryError::InvalidOperator(op) if op == "=~"));
    assert!(query.conditions().is_empty());
}

#[test]
fn malformed_references_fail() {
    let mut query = Query::new();
    assert!(matches!(
        query.select("", ["id"]),
        Err(QueryError::InvalidReference(_))
    ));
    query.select("users", ["id"]).unwrap();
    assert!(matches!(
        query.where_eq("users.", 1),
        Err(QueryError::InvalidReference(_))
    ));
    assert!(matches!(
        query.group_by("users", " "),
        Err(QueryError::InvalidReference(_))
    ));
}

#[test]
fn aliased_table_colliding_with_joined_table_fails() {
    let mut query = Query::new();
    query
        .select("orders", ["id"])
        .unwrap()
        .join("users", "orders.user_id", "users.id")
        .unwrap();
    let err = query
        .join("users AS m", "users.manager_id", "m.id")
        .err()
        .unwrap();
    assert!(matches!(
        err,
        QueryError::UnresolvableTableConflict { ref table, ref alias }
            if table == "users" && alias == "m"
    ));
}

// ============================================================================
// Dialects and qualification
// ============================================================================

#[test]
fn ansi_dialect_quotes_identifiers() {
    let mut query = Query::new().with_dialect(Arc::new(AnsiDialect));
    query
        .select_all("users")
        .unwrap()
        .join("orders", "users.id", "orders.user_id")
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        r#"SELECT * FROM "users" JOIN "orders" ON "users"."id" = "orders"."user_id""#
    );
}

#[test]
fn config_selects_mysql_dialect_and_qualification() {
    let config = QuillConfig::from_toml(
        "[builder]\ndialect = \"mysql\"\nqualify_columns = \"always\"\n",
    )
    .unwrap();
    let mut query = Query::from_config(&config);
    query
        .select("users", ["id"])
        .unwrap()
        .where_eq("active", true)
        .unwrap()
        .where_eq("path", r"C:\tmp")
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        r"SELECT `users`.`id` FROM `users` WHERE `users`.`active` = 1 AND `users`.`path` = 'C:\\tmp'"
    );
}

#[test]
fn never_qualify_drops_table_prefixes() {
    let mut query = Query::new().with_qualify(QualifyColumns::Never);
    query
        .select("users", ["id"])
        .unwrap()
        .join("orders", "users.id", "orders.user_id")
        .unwrap();
    assert_eq!(
        query.generate().unwrap(),
        "SELECT id FROM users JOIN orders ON id = user_id"
    );
}
