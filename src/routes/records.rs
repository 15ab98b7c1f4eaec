//! Record routes: one CRUD block per collection plus the aggregate reports.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::handlers::report::{
    course_average, course_tests, student_average, student_tests, teacher_summary,
};
use crate::model::{Course, Entity, Student, Teacher, Test};
use crate::state::AppState;
use axum::{routing::get, Router};

fn crud_routes<E: Entity>() -> Router<AppState> {
    let base = format!("/{}", E::KIND.collection());
    Router::new()
        .route(&base, get(list::<E>).post(create::<E>))
        .route(
            &format!("{}/:id", base),
            get(read::<E>)
                .put(update::<E>)
                .patch(update::<E>)
                .delete(delete_handler::<E>),
        )
}

pub fn records_routes(state: AppState) -> Router {
    Router::new()
        .merge(crud_routes::<Teacher>())
        .merge(crud_routes::<Course>())
        .merge(crud_routes::<Student>())
        .merge(crud_routes::<Test>())
        .route("/students/:id/tests", get(student_tests))
        .route("/students/:id/average", get(student_average))
        .route("/courses/:id/tests", get(course_tests))
        .route("/courses/:id/average", get(course_average))
        .route("/teachers/:id/summary", get(teacher_summary))
        .with_state(state)
}
