use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::warn;

use crate::db::models::ActivityLog;

/// Appends an audit row. Fire-and-forget: a failed insert is logged and
/// swallowed so audit trouble never fails the primary operation.
pub async fn record(
    pool: &SqlitePool,
    user_id: Option<i64>,
    user_email: Option<&str>,
    action: &str,
    details: &str,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO activity_logs (user_id, user_email, action, details, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(user_id)
    .bind(user_email)
    .bind(action)
    .bind(details)
    .bind(OffsetDateTime::now_utc())
    .execute(pool)
    .await;

    if let Err(e) = result {
        warn!(error = %e, action, "failed to record activity");
    }
}

pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<ActivityLog>, sqlx::Error> {
    sqlx::query_as::<_, ActivityLog>(
        "SELECT * FROM activity_logs ORDER BY created_at DESC, id DESC LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
