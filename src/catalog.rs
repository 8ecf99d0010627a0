//! Catalog store access: SQLite pool construction and embedded migrations.

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens the catalog database.
///
/// SQLite permits a single writer at a time, so the pool holds exactly one
/// connection: every transaction's read-check-write sequence runs to
/// completion before any other operation touches the store. WAL mode and the
/// busy timeout cover writers in other processes.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 10000")
        .execute(&pool)
        .await?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:")
        .await
        .expect("in-memory catalog should open");
    MIGRATOR
        .run(&pool)
        .await
        .expect("migrations should apply cleanly");
    pool
}
