use std::{fs, path::Path, sync::Arc};

use quillsql::{DuckDbExecutor, Query};

fn bootstrap_duckdb(path: &Path) -> anyhow::Result<()> {
    let conn = duckdb::Connection::open(path)?;
    conn.execute_batch(
        "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name VARCHAR,
            manager_id INTEGER
        );
        CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            user_id INTEGER,
            total DOUBLE
        );
        INSERT INTO users VALUES
            (1, 'Alice', NULL),
            (2, 'Bob', 1),
            (3, 'Carla', 1);
        INSERT INTO orders VALUES
            (1, 1, 100.0),
            (2, 2, 50.0),
            (3, 2, 25.0);
        ",
    )?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let db_path = Path::new("demo.duckdb");
    if db_path.exists() {
        fs::remove_file(db_path)?;
    }
    bootstrap_duckdb(db_path)?;

    let executor = Arc::new(DuckDbExecutor::new(db_path));
    let mut query = Query::new().with_executor(executor);
    query
        .select("users", ["name"])?
        .select("orders", [("spent", "SUM(total)")])?
        .join("orders", "users.id", "orders.user_id")?
        .where_("orders.total", ">", 20)?
        .group_by("users", "name")?;

    println!("{}", query.generate()?);
    let result = query.get().await?;
    println!("{}", serde_json::to_string_pretty(&result.rows)?);
    Ok(())
}
