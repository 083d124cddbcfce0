use axum::{routing::get, Router};

use super::handlers::{create_user, get_user, list_users};
use crate::app_state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user))
}
