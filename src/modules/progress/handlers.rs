use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::QuizScoreRequest;
use crate::error::AppResult;
use crate::middleware::auth::AuthContext;
use crate::services::dashboard::DashboardSummary;
use crate::services::progress::{self, CompletionOutcome, LessonOutcome, QuizOutcome};

/// Quiz submissions always apply to the caller's own progress row.
pub async fn submit_quiz(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<QuizScoreRequest>,
) -> AppResult<Json<QuizOutcome>> {
    body.validate()?;

    let outcome = progress::apply_quiz_score(
        &state.db,
        state.notifier.as_ref(),
        ctx.user_id,
        body.course_id,
        body.score,
    )
    .await?;

    state.dashboard.invalidate(ctx.user_id).await;
    Ok(Json(outcome))
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(lesson_id): Path<i64>,
) -> AppResult<Json<LessonOutcome>> {
    let outcome = progress::apply_lesson_completion(&state.db, ctx.user_id, lesson_id).await?;
    state.dashboard.invalidate(ctx.user_id).await;
    Ok(Json(outcome))
}

pub async fn complete_course(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(course_id): Path<i64>,
) -> AppResult<Json<CompletionOutcome>> {
    let outcome = progress::complete_course(
        &state.db,
        state.notifier.as_ref(),
        ctx.user_id,
        course_id,
    )
    .await?;
    state.dashboard.invalidate(ctx.user_id).await;
    Ok(Json(outcome))
}

pub async fn dashboard(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<DashboardSummary>> {
    let summary = state.dashboard.get_or_load(&state.db, ctx.user_id).await?;
    Ok(Json(summary))
}
