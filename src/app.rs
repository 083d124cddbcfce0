use axum::{middleware, routing::get, Json, Router};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    middleware::{auth::auth_context_middleware, tracing::observability_middleware},
    modules::{
        admin::routes::admin_routes, courses::routes::course_routes,
        enrollments::routes::enrollment_routes, progress::routes::progress_routes,
        users::routes::user_routes,
    },
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .nest("/api/courses", course_routes())
        .nest("/api/enrollments", enrollment_routes())
        .nest("/api/progress", progress_routes())
        .nest("/api/users", user_routes())
        .nest("/api/admin", admin_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_context_middleware,
        ))
        .layer(middleware::from_fn(observability_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hello() -> &'static str {
    "CPD Portal says hello!\n"
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(json!({
        "status": "ok",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
        }
    }))
}
