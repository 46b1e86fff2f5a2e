//! Fixtures for HTTP tests: a live server on an ephemeral port backed by an
//! in-memory database, a reqwest client, and row factories.

use crate::config::{Config, DEFAULT_MAX_STUDENTS_PER_COURSE};
use crate::db::{self, course::CourseRepository, student::StudentRepository};
use crate::models::{CourseView, NewCourse, NewStudent, Student};
use crate::AppState;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_NAME: AtomicUsize = AtomicUsize::new(1);

fn generated_name(prefix: &str) -> String {
    format!("{} {}", prefix, NEXT_NAME.fetch_add(1, Ordering::Relaxed))
}

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            max_students_per_course: DEFAULT_MAX_STUDENTS_PER_COURSE,
        }
    }

    pub async fn spawn() -> Self {
        Self::spawn_with(Self::config()).await
    }

    pub async fn spawn_with(config: Config) -> Self {
        let pool = db::test_pool().await;
        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let state = Arc::new(AppState {
            db_pool: pool.clone(),
            config,
        });
        tokio::spawn(async move {
            let _ = axum::serve(listener, crate::app(state)).await;
        });

        Self {
            address: format!("http://{}", addr),
            pool,
            client: reqwest::Client::new(),
        }
    }

    /// Absolute URL for a path under the versioned API root
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("GET request")
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .expect("GET request")
    }

    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(body).send().await.expect("POST request")
    }

    pub async fn put(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client.put(self.url(path)).json(body).send().await.expect("PUT request")
    }

    pub async fn patch(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client.patch(self.url(path)).json(body).send().await.expect("PATCH request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.expect("DELETE request")
    }

    pub fn courses(&self) -> CourseFactory<'_> {
        CourseFactory {
            pool: &self.pool,
            course: NewCourse::new(generated_name("Course")),
        }
    }

    pub fn students(&self) -> StudentFactory<'_> {
        StudentFactory {
            pool: &self.pool,
            student: NewStudent::new(generated_name("Student")),
        }
    }
}

/// Inserts a course row directly, bypassing the API
pub struct CourseFactory<'a> {
    pool: &'a SqlitePool,
    course: NewCourse,
}

impl CourseFactory<'_> {
    pub fn name(mut self, name: &str) -> Self {
        self.course.name = name.to_string();
        self
    }

    pub fn id(mut self, id: i64) -> Self {
        self.course.id = Some(id);
        self
    }

    pub fn students(mut self, students: Vec<i64>) -> Self {
        self.course.students = students;
        self
    }

    pub async fn create(self) -> CourseView {
        let repo = CourseRepository::new(self.pool.clone());
        let course = repo.create(&self.course).await.expect("insert course");
        repo.view(course).await.expect("load course students")
    }
}

pub struct StudentFactory<'a> {
    pool: &'a SqlitePool,
    student: NewStudent,
}

impl StudentFactory<'_> {
    pub fn name(mut self, name: &str) -> Self {
        self.student.name = name.to_string();
        self
    }

    pub fn birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.student.birth_date = Some(birth_date);
        self
    }

    pub async fn create(self) -> Student {
        StudentRepository::new(self.pool.clone())
            .create(&self.student)
            .await
            .expect("insert student")
    }
}
