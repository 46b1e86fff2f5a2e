mod course;
mod student;

use crate::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Course and student endpoints, mounted under the versioned API root
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/courses/",
            get(course::list_courses).post(course::create_course),
        )
        .route(
            "/courses/:id/",
            get(course::retrieve_course)
                .put(course::update_course)
                .patch(course::partial_update_course)
                .delete(course::delete_course),
        )
        .route(
            "/students/",
            get(student::list_students).post(student::create_student),
        )
        .route(
            "/students/:id/",
            get(student::retrieve_student)
                .put(student::update_student)
                .patch(student::partial_update_student)
                .delete(student::delete_student),
        )
}
