use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Server-side session record backing the auth-context middleware.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}
