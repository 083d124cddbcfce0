use async_trait::async_trait;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Fire-and-forget message dispatch. Implementations must never surface
/// delivery failure to callers beyond the returned flag; enrollment and
/// assignment outcomes do not depend on it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool;
}

/// Default sender: records an in-app notification row for the addressed
/// user and logs the hand-off.
pub struct InAppNotifier {
    pool: SqlitePool,
}

impl InAppNotifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<bool, sqlx::Error> {
        let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?1")
            .bind(to.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        let Some(user_id) = user_id else {
            warn!(to, "notification dropped: no user with that address");
            return Ok(false);
        };

        sqlx::query(
            "INSERT INTO notifications (user_id, subject, body, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user_id)
        .bind(subject)
        .bind(body)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.pool)
        .await?;

        debug!(to, subject, "notification recorded");
        Ok(true)
    }
}

#[async_trait]
impl Notifier for InAppNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        match self.deliver(to, subject, body).await {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!(error = %e, to, subject, "notification delivery failed");
                false
            }
        }
    }
}
