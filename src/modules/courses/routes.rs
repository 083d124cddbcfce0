use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    create_course, create_lesson, create_question, delete_course, delete_lesson, delete_question,
    get_course, list_course_questions, list_courses, list_lesson_questions, list_lessons,
    schedule_course, update_course, update_lesson,
};
use crate::app_state::AppState;

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/:id/schedule", post(schedule_course))
        .route("/:id/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/:id/lessons/:lesson_id",
            put(update_lesson).delete(delete_lesson),
        )
        .route(
            "/:id/lessons/:lesson_id/questions",
            get(list_lesson_questions),
        )
        .route(
            "/:id/questions",
            get(list_course_questions).post(create_question),
        )
        .route("/:id/questions/:question_id", delete(delete_question))
}
