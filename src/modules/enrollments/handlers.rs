use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{EnrollRequest, UserCourseProgress};
use crate::db::repositories::ProgressRepository;
use crate::error::AppResult;
use crate::middleware::auth::AuthContext;
use crate::services::enrollment;

/// Learners enroll themselves; admins may enroll anyone.
pub async fn enroll(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<EnrollRequest>,
) -> AppResult<Json<serde_json::Value>> {
    body.validate()?;
    if body.user_id != ctx.user_id {
        ctx.require_admin()?;
    }

    let outcome = enrollment::enroll(
        &state.db,
        state.notifier.as_ref(),
        body.user_id,
        body.course_id,
        body.scheduled_date,
    )
    .await?;

    state.dashboard.invalidate(body.user_id).await;

    Ok(Json(json!({
        "outcome": outcome,
        "user_id": body.user_id,
        "course_id": body.course_id,
        "scheduled_date": body.scheduled_date,
    })))
}

pub async fn list_user_enrollments(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<UserCourseProgress>>> {
    if user_id != ctx.user_id {
        ctx.require_admin()?;
    }
    let rows = ProgressRepository::list_for_user(&state.db, user_id).await?;
    Ok(Json(rows))
}
