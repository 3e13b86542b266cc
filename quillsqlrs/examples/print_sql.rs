use std::env;

use quillsql::{Query, QuillConfig};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("Usage: print_sql [min_age]");
    eprintln!("Example: RUST_LOG=quillsql=debug cargo run --example print_sql -- 21");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let min_age: i64 = match env::args().nth(1) {
        Some(arg) => arg.parse().map_err(|e| {
            usage();
            anyhow::anyhow!("invalid min_age {arg:?}: {e}")
        })?,
        None => 18,
    };

    let config = QuillConfig::load_default();
    let mut query = Query::from_config(&config);
    query
        .select("users", ["id", "name"])?
        .select("orders", [("order_total", "SUM(total)")])?
        .join("orders", "users.id", "orders.user_id")?
        .where_("users.age", ">=", min_age)?;
    query
        .or_where_complex()
        .where_eq("users.role", "admin")?
        .where_("orders.status", "IN", vec!["paid", "shipped"])?;
    query.group_by("users", "id")?;

    println!("{}", query.generate()?);
    Ok(())
}
