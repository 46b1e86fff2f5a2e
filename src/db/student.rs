use crate::models::{ListFilter, NewStudent, Student, StudentChanges};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::QueryBuilder;
use std::collections::HashSet;

use super::push_filters;

pub struct StudentRepository {
    pool: SqlitePool,
}

impl StudentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Student>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, name, birth_date FROM students");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY id");
        builder
            .build_query_as::<Student>()
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>("SELECT id, name, birth_date FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, student: &NewStudent) -> Result<Student, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            "INSERT INTO students (id, name, birth_date) VALUES (?, ?, ?)
             RETURNING id, name, birth_date"
        )
        .bind(student.id)
        .bind(&student.name)
        .bind(student.birth_date)
        .fetch_one(&self.pool)
        .await
    }

    /// Returns None when no student has this id
    pub async fn update(&self, id: i64, changes: StudentChanges) -> Result<Option<Student>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Student>(
            "SELECT id, name, birth_date FROM students WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            tx.rollback().await?;
            return Ok(None);
        };

        let merged = current.merge(changes);
        let updated = sqlx::query_as::<_, Student>(
            "UPDATE students SET name = ?, birth_date = ? WHERE id = ?
             RETURNING id, name, birth_date"
        )
        .bind(&merged.name)
        .bind(merged.birth_date)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Returns false when no student has this id
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Ids from `ids` that have no student row, in input order.
/// The ids travel as one JSON array parameter, so the list length is not
/// bounded by SQLite's variable limit.
pub(crate) async fn missing_students(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found: HashSet<i64> = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM students WHERE id IN (SELECT value FROM json_each(?))"
    )
    .bind(id_array(ids))
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .collect();

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}

pub(crate) fn id_array(ids: &[i64]) -> String {
    serde_json::Value::from(ids.to_vec()).to_string()
}
