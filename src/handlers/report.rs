//! Aggregate endpoints: tests per student/course, averages, teacher summary.

use crate::error::AppError;
use crate::extractors::RecordId;
use crate::model::{Course, Student, Teacher};
use crate::response::ok;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

/// GET /students/:id/tests
pub async fn student_tests(
    State(state): State<AppState>,
    id: RecordId<Student>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.records.tests_for_student(id.get()).await?))
}

/// GET /courses/:id/tests
pub async fn course_tests(
    State(state): State<AppState>,
    id: RecordId<Course>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.records.tests_for_course(id.get()).await?))
}

/// GET /students/:id/average
pub async fn student_average(
    State(state): State<AppState>,
    id: RecordId<Student>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.records.average_for_student(id.get()).await?))
}

/// GET /courses/:id/average
pub async fn course_average(
    State(state): State<AppState>,
    id: RecordId<Course>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.records.average_for_course(id.get()).await?))
}

/// GET /teachers/:id/summary
pub async fn teacher_summary(
    State(state): State<AppState>,
    id: RecordId<Teacher>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.records.teacher_summary(id.get()).await?))
}
