use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{ActivityLog, SystemSetting, UpsertSetting};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthContext;
use crate::services::{activity, settings};

const ACTIVITY_PAGE_SIZE: i64 = 100;

pub async fn list_activity(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<Vec<ActivityLog>>> {
    ctx.require_admin()?;
    let logs = activity::list_recent(&state.db, ACTIVITY_PAGE_SIZE).await?;
    Ok(Json(logs))
}

pub async fn get_setting(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(key): Path<String>,
) -> AppResult<Json<SystemSetting>> {
    ctx.require_admin()?;
    let setting = settings::find(&state.db, &key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("setting '{}' not found", key)))?;
    Ok(Json(setting))
}

pub async fn put_setting(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(key): Path<String>,
    Json(body): Json<UpsertSetting>,
) -> AppResult<Json<SystemSetting>> {
    ctx.require_admin()?;
    body.validate()?;

    let setting = settings::put_setting(
        &state.db,
        &key,
        &body.setting_value,
        body.description.as_deref(),
    )
    .await?;

    activity::record(
        &state.db,
        Some(ctx.user_id),
        None,
        "setting_updated",
        &format!("'{}' updated", key),
    )
    .await;
    Ok(Json(setting))
}
