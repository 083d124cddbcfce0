use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// In-app notification row written by the default notification sender.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}
