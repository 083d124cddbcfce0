use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::warn;

use crate::db::models::SystemSetting;
use crate::error::AppError;

/// Read-only string lookup with a caller-supplied default. Absence and
/// read errors both fall back to the default; errors are logged.
pub async fn get_setting(pool: &SqlitePool, key: &str, default: &str) -> String {
    let result = sqlx::query_scalar::<_, String>(
        "SELECT setting_value FROM system_settings WHERE setting_key = ?1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(value)) => value,
        Ok(None) => default.to_string(),
        Err(e) => {
            warn!(error = %e, key, "settings lookup failed, using default");
            default.to_string()
        }
    }
}

pub async fn find(
    pool: &SqlitePool,
    key: &str,
) -> Result<Option<SystemSetting>, sqlx::Error> {
    sqlx::query_as::<_, SystemSetting>(
        "SELECT * FROM system_settings WHERE setting_key = ?1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

pub async fn put_setting(
    pool: &SqlitePool,
    key: &str,
    value: &str,
    description: Option<&str>,
) -> Result<SystemSetting, AppError> {
    sqlx::query(
        r#"
        INSERT INTO system_settings (setting_key, setting_value, description, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (setting_key)
        DO UPDATE SET setting_value = excluded.setting_value,
                      description = COALESCE(excluded.description, description),
                      updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(description)
    .bind(OffsetDateTime::now_utc())
    .execute(pool)
    .await?;

    let setting = sqlx::query_as::<_, SystemSetting>(
        "SELECT * FROM system_settings WHERE setting_key = ?1",
    )
    .bind(key)
    .fetch_one(pool)
    .await?;
    Ok(setting)
}
