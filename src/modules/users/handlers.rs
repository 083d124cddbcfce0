use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{NewUser, User};
use crate::db::repositories::UserRepository;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthContext;
use crate::services::activity;

pub async fn list_users(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<Vec<User>>> {
    ctx.require_admin()?;
    let users = UserRepository::list(&state.db).await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<NewUser>,
) -> AppResult<Json<User>> {
    ctx.require_admin()?;
    body.validate()?;

    if UserRepository::find_by_email(&state.db, &body.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "user '{}' already exists",
            body.email.to_lowercase()
        )));
    }

    let user = UserRepository::create(&state.db, &body).await?;
    activity::record(
        &state.db,
        Some(ctx.user_id),
        Some(&user.email),
        "user_created",
        &format!("user {} created", user.id),
    )
    .await;
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    if user_id != ctx.user_id {
        ctx.require_admin()?;
    }
    let user = UserRepository::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;
    Ok(Json(user))
}
