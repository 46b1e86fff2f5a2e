use crate::AppState;
use crate::db::student::StudentRepository;
use crate::error::ApiError;
use crate::models::{ListParams, Student, StudentPayload};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

pub async fn list_students(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let Query(params) = query?;
    let filter = params.into_filter()?;

    let student_repo = StudentRepository::new(state.db_pool.clone());
    let students = student_repo.list(&filter).await?;
    tracing::debug!("Listing {} student(s) for filter {:?}", students.len(), filter);

    Ok(Json(students))
}

pub async fn retrieve_student(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Student>, ApiError> {
    let Path(id) = path?;

    let student_repo = StudentRepository::new(state.db_pool.clone());
    let student = student_repo.get_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(student))
}

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let Json(payload) = payload?;
    let new_student = payload.into_new()?;

    let student_repo = StudentRepository::new(state.db_pool.clone());
    let student = student_repo.create(&new_student).await?;
    tracing::info!("Created student {} ({})", student.id, student.name);

    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Json<Student>, ApiError> {
    apply_update(state, path?, payload?, false).await
}

pub async fn partial_update_student(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Json<Student>, ApiError> {
    apply_update(state, path?, payload?, true).await
}

async fn apply_update(
    state: Arc<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StudentPayload>,
    partial: bool,
) -> Result<Json<Student>, ApiError> {
    let student_repo = StudentRepository::new(state.db_pool.clone());
    if student_repo.get_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let changes = payload.into_changes(partial)?;
    let student = student_repo.update(id, changes).await?.ok_or(ApiError::NotFound)?;
    tracing::info!("Updated student {} ({})", student.id, student.name);

    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;

    let student_repo = StudentRepository::new(state.db_pool.clone());
    if !student_repo.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!("Deleted student {}", id);

    Ok(StatusCode::NO_CONTENT)
}
