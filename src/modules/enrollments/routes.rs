use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{enroll, list_user_enrollments};
use crate::app_state::AppState;

pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(enroll))
        .route("/user/:id", get(list_user_enrollments))
}
