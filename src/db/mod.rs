pub mod course;
pub mod student;

use crate::models::ListFilter;
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};
use sqlx::QueryBuilder;
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
}

/// Append `WHERE id = ? AND name = ?` for whichever filters are set
pub(crate) fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ListFilter) {
    let mut keyword = " WHERE ";
    if let Some(id) = filter.id {
        builder.push(keyword).push("id = ").push_bind(id);
        keyword = " AND ";
    }
    if let Some(name) = &filter.name {
        builder.push(keyword).push("name = ").push_bind(name.clone());
    }
}

/// Single-connection in-memory database with migrations applied.
/// One connection keeps every query on the same in-memory database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    run_migrations(&pool).await.expect("run migrations");
    pool
}
