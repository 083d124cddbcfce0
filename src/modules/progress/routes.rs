use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{complete_course, complete_lesson, dashboard, submit_quiz};
use crate::app_state::AppState;

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/quiz", post(submit_quiz))
        .route("/lessons/:lesson_id/complete", post(complete_lesson))
        .route("/courses/:course_id/complete", post(complete_course))
        .route("/dashboard", get(dashboard))
}
