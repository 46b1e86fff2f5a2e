use crate::AppState;
use crate::db::course::CourseRepository;
use crate::error::ApiError;
use crate::models::{CoursePayload, CourseView, ListParams};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<CourseView>>, ApiError> {
    let Query(params) = query?;
    let filter = params.into_filter()?;

    let course_repo = CourseRepository::new(state.db_pool.clone());
    let courses = course_repo.list_views(&filter).await?;
    tracing::debug!("Listing {} course(s) for filter {:?}", courses.len(), filter);

    Ok(Json(courses))
}

pub async fn retrieve_course(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<CourseView>, ApiError> {
    let Path(id) = path?;

    let course_repo = CourseRepository::new(state.db_pool.clone());
    let course = course_repo.get_by_id(id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(course_repo.view(course).await?))
}

pub async fn create_course(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CoursePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CourseView>), ApiError> {
    let Json(payload) = payload?;
    let new_course = payload.into_new(state.config.max_students_per_course)?;

    let course_repo = CourseRepository::new(state.db_pool.clone());
    let course = course_repo.create(&new_course).await?;
    tracing::info!("Created course {} ({})", course.id, course.name);

    Ok((StatusCode::CREATED, Json(course_repo.view(course).await?)))
}

/// PUT: replaces every writable field
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CoursePayload>, JsonRejection>,
) -> Result<Json<CourseView>, ApiError> {
    apply_update(state, path?, payload?, false).await
}

/// PATCH: changes only the supplied fields
pub async fn partial_update_course(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CoursePayload>, JsonRejection>,
) -> Result<Json<CourseView>, ApiError> {
    apply_update(state, path?, payload?, true).await
}

async fn apply_update(
    state: Arc<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CoursePayload>,
    partial: bool,
) -> Result<Json<CourseView>, ApiError> {
    let course_repo = CourseRepository::new(state.db_pool.clone());
    // Unknown ids are 404 even when the body is also invalid
    if course_repo.get_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let changes = payload.into_changes(partial, state.config.max_students_per_course)?;

    let course = course_repo.update(id, &changes).await?.ok_or(ApiError::NotFound)?;
    tracing::info!("Updated course {} ({})", course.id, course.name);

    Ok(Json(course_repo.view(course).await?))
}

pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;

    let course_repo = CourseRepository::new(state.db_pool.clone());
    if !course_repo.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!("Deleted course {}", id);

    Ok(StatusCode::NO_CONTENT)
}
