use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Append-only audit row; never updated or deleted by application logic.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub action: String,
    pub details: Option<String>,
    pub created_at: OffsetDateTime,
}
