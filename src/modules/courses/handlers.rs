use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{
    Course, Lesson, NewCourse, NewLesson, NewQuestion, QuestionWithOptions,
    ScheduleCourseRequest, UpdateCourse, UpdateLesson,
};
use crate::db::repositories::{
    CourseRepository, LessonRepository, QuestionRepository,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthContext;
use crate::services::{activity, cloner};

#[derive(Debug, Deserialize)]
pub struct CourseListQuery {
    pub is_template: Option<bool>,
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> AppResult<Json<Vec<Course>>> {
    let courses = CourseRepository::list(&state.db, query.is_template).await?;
    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> AppResult<Json<Course>> {
    let course = CourseRepository::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;
    Ok(Json(course))
}

pub async fn create_course(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<NewCourse>,
) -> AppResult<Json<Course>> {
    ctx.require_admin()?;
    body.validate()?;

    let course = CourseRepository::create(&state.db, &body).await?;
    activity::record(
        &state.db,
        Some(ctx.user_id),
        None,
        "course_created",
        &format!("'{}' (id {})", course.title, course.id),
    )
    .await;
    Ok(Json(course))
}

pub async fn update_course(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(course_id): Path<i64>,
    Json(body): Json<UpdateCourse>,
) -> AppResult<Json<Course>> {
    ctx.require_admin()?;
    body.validate()?;

    CourseRepository::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;

    let course = CourseRepository::update(&state.db, course_id, &body).await?;
    activity::record(
        &state.db,
        Some(ctx.user_id),
        None,
        "course_updated",
        &format!("'{}' (id {})", course.title, course.id),
    )
    .await;
    Ok(Json(course))
}

/// Deletes a course together with its lessons and question bank. The store
/// never cascades; each owned table is cleared explicitly, inside one
/// transaction so a half-deleted course never persists.
pub async fn delete_course(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(course_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    ctx.require_admin()?;

    let course = CourseRepository::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;

    let mut tx = state.db.begin().await?;
    QuestionRepository::delete_for_course(&mut tx, course_id).await?;
    LessonRepository::delete_for_course(&mut *tx, course_id).await?;
    CourseRepository::delete(&mut *tx, course_id).await?;
    tx.commit().await?;

    activity::record(
        &state.db,
        Some(ctx.user_id),
        None,
        "course_deleted",
        &format!("'{}' (id {})", course.title, course_id),
    )
    .await;
    Ok(Json(json!({ "deleted": course_id })))
}

/// Schedules a template into a dated instance: the clone runs inside a
/// single transaction so a half-copied course never persists.
pub async fn schedule_course(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(course_id): Path<i64>,
    Json(body): Json<ScheduleCourseRequest>,
) -> AppResult<Json<Course>> {
    ctx.require_admin()?;
    body.validate()?;

    if body.end_date < body.start_date {
        return Err(AppError::Validation(
            "end_date must not precede start_date".to_string(),
        ));
    }

    let template = CourseRepository::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;
    if !template.is_template {
        return Err(AppError::Validation(
            "only template courses can be scheduled".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;
    let cloned = cloner::clone_course(
        &mut tx,
        cloner::CloneSpec {
            template_id: course_id,
            start_date: body.start_date,
            end_date: body.end_date,
            title_override: body.title.as_deref(),
            copy_questions: body.copy_questions.unwrap_or(true),
        },
    )
    .await?;
    tx.commit().await?;

    let course = CourseRepository::get(&state.db, cloned.course_id).await?;
    activity::record(
        &state.db,
        Some(ctx.user_id),
        None,
        "course_scheduled",
        &format!(
            "'{}' (id {}) cloned from template {}",
            course.title, course.id, course_id
        ),
    )
    .await;
    Ok(Json(course))
}

pub async fn list_lessons(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> AppResult<Json<Vec<Lesson>>> {
    CourseRepository::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;
    let lessons = LessonRepository::list_for_course(&state.db, course_id).await?;
    Ok(Json(lessons))
}

pub async fn create_lesson(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(course_id): Path<i64>,
    Json(body): Json<NewLesson>,
) -> AppResult<Json<Lesson>> {
    ctx.require_admin()?;
    body.validate()?;

    CourseRepository::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;

    let lesson = LessonRepository::create(&state.db, course_id, &body).await?;
    Ok(Json(lesson))
}

pub async fn update_lesson(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((course_id, lesson_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateLesson>,
) -> AppResult<Json<Lesson>> {
    ctx.require_admin()?;
    body.validate()?;

    let lesson = LessonRepository::find_by_id(&state.db, lesson_id)
        .await?
        .filter(|l| l.course_id == course_id)
        .ok_or_else(|| AppError::NotFound(format!("lesson {} not found", lesson_id)))?;

    let updated = LessonRepository::update(&state.db, lesson.id, &body).await?;
    Ok(Json(updated))
}

pub async fn delete_lesson(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((course_id, lesson_id)): Path<(i64, i64)>,
) -> AppResult<Json<serde_json::Value>> {
    ctx.require_admin()?;

    LessonRepository::find_by_id(&state.db, lesson_id)
        .await?
        .filter(|l| l.course_id == course_id)
        .ok_or_else(|| AppError::NotFound(format!("lesson {} not found", lesson_id)))?;

    let mut tx = state.db.begin().await?;
    QuestionRepository::delete_for_lesson(&mut tx, lesson_id).await?;
    LessonRepository::delete(&mut *tx, lesson_id).await?;
    tx.commit().await?;
    Ok(Json(json!({ "deleted": lesson_id })))
}

pub async fn list_course_questions(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> AppResult<Json<Vec<QuestionWithOptions>>> {
    let questions = QuestionRepository::list_for_course(&state.db, course_id).await?;
    Ok(Json(questions))
}

pub async fn list_lesson_questions(
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<QuestionWithOptions>>> {
    LessonRepository::find_by_id(&state.db, lesson_id)
        .await?
        .filter(|l| l.course_id == course_id)
        .ok_or_else(|| AppError::NotFound(format!("lesson {} not found", lesson_id)))?;
    let questions = QuestionRepository::list_for_lesson(&state.db, lesson_id).await?;
    Ok(Json(questions))
}

/// Creates a question with its options in one transaction. A question hangs
/// off either the course-level exam or one lesson checkpoint, and at least
/// one option must be marked correct; both invariants live here, not in the
/// store.
pub async fn create_question(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(course_id): Path<i64>,
    Json(mut body): Json<NewQuestion>,
) -> AppResult<Json<QuestionWithOptions>> {
    ctx.require_admin()?;
    body.validate()?;

    CourseRepository::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;

    if body.course_id.is_none() && body.lesson_id.is_none() {
        body.course_id = Some(course_id);
    }
    match (body.course_id, body.lesson_id) {
        (Some(_), None) | (None, Some(_)) => {}
        _ => {
            return Err(AppError::Validation(
                "question must belong to exactly one of a course or a lesson".to_string(),
            ))
        }
    }
    if let Some(lesson_id) = body.lesson_id {
        LessonRepository::find_by_id(&state.db, lesson_id)
            .await?
            .filter(|l| l.course_id == course_id)
            .ok_or_else(|| AppError::NotFound(format!("lesson {} not found", lesson_id)))?;
    }
    if !body.options.iter().any(|o| o.is_correct) {
        return Err(AppError::Validation(
            "at least one option must be marked correct".to_string(),
        ));
    }

    let question = QuestionRepository::create_with_options(&state.db, &body).await?;
    Ok(Json(question))
}

pub async fn delete_question(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((_course_id, question_id)): Path<(i64, i64)>,
) -> AppResult<Json<serde_json::Value>> {
    ctx.require_admin()?;
    let deleted = QuestionRepository::delete(&state.db, question_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!(
            "question {} not found",
            question_id
        )));
    }
    Ok(Json(json!({ "deleted": question_id })))
}
