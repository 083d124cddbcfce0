use axum::{routing::get, Router};

use super::handlers::{get_setting, list_activity, put_setting};
use crate::app_state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/activity", get(list_activity))
        .route("/settings/:key", get(get_setting).put(put_setting))
}
