use crate::models::{Course, CourseChanges, CourseView, ListFilter, NewCourse};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::QueryBuilder;
use std::collections::HashMap;

use super::push_filters;
use super::student::{id_array, missing_students};

#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("Unknown students: {0:?}")]
    UnknownStudents(Vec<i64>),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct CourseRepository {
    pool: SqlitePool,
}

impl CourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Course>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id, name FROM courses");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY id");
        builder
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await
    }

    /// Matching courses with their enrolled students
    pub async fn list_views(&self, filter: &ListFilter) -> Result<Vec<CourseView>, sqlx::Error> {
        let courses = self.list(filter).await?;
        let mut enrollments = self.enrollments(filter).await?;
        Ok(courses
            .into_iter()
            .map(|course| {
                let students = enrollments.remove(&course.id).unwrap_or_default();
                course.with_students(students)
            })
            .collect())
    }

    pub async fn view(&self, course: Course) -> Result<CourseView, sqlx::Error> {
        let filter = ListFilter {
            id: Some(course.id),
            name: None,
        };
        let students = self
            .enrollments(&filter)
            .await?
            .remove(&course.id)
            .unwrap_or_default();
        Ok(course.with_students(students))
    }

    /// Enrolled student ids, ascending, for every course matching `filter`
    pub async fn enrollments(&self, filter: &ListFilter) -> Result<HashMap<i64, Vec<i64>>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT course_students.course_id, course_students.student_id
             FROM course_students JOIN courses ON courses.id = course_students.course_id"
        );
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY course_students.course_id, course_students.student_id");

        let rows = builder
            .build_query_as::<(i64, i64)>()
            .fetch_all(&self.pool)
            .await?;

        let mut enrollments: HashMap<i64, Vec<i64>> = HashMap::new();
        for (course_id, student_id) in rows {
            enrollments.entry(course_id).or_default().push(student_id);
        }
        Ok(enrollments)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>("SELECT id, name FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Insert the course and its enrollments in one transaction
    pub async fn create(&self, course: &NewCourse) -> Result<Course, EnrollmentError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (id, name) VALUES (?, ?) RETURNING id, name"
        )
        .bind(course.id)
        .bind(&course.name)
        .fetch_one(&mut *tx)
        .await?;

        // Dropping the transaction on error rolls the insert back
        replace_students(&mut *tx, created.id, &course.students).await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Returns None when no course has this id
    pub async fn update(&self, id: i64, changes: &CourseChanges) -> Result<Option<Course>, EnrollmentError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Course>(
            "UPDATE courses SET name = COALESCE(?, name) WHERE id = ? RETURNING id, name"
        )
        .bind(&changes.name)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(course) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(students) = &changes.students {
            replace_students(&mut *tx, course.id, students).await?;
        }

        tx.commit().await?;
        Ok(Some(course))
    }

    /// Returns false when no course has this id
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Must run after the transaction's first write: the write lock is held from
/// then on, so no student can be deleted between the check and the insert.
async fn replace_students(
    conn: &mut SqliteConnection,
    course_id: i64,
    students: &[i64],
) -> Result<(), EnrollmentError> {
    let missing = missing_students(conn, students).await?;
    if !missing.is_empty() {
        return Err(EnrollmentError::UnknownStudents(missing));
    }

    sqlx::query("DELETE FROM course_students WHERE course_id = ?")
        .bind(course_id)
        .execute(&mut *conn)
        .await?;

    if students.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO course_students (course_id, student_id)
         SELECT ?, value FROM json_each(?)"
    )
    .bind(course_id)
    .bind(id_array(students))
    .execute(&mut *conn)
    .await?;
    Ok(())
}
