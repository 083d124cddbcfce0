use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SystemSetting {
    pub id: i64,
    pub setting_key: String,
    pub setting_value: String,
    pub description: Option<String>,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertSetting {
    #[validate(length(min = 1))]
    pub setting_value: String,
    pub description: Option<String>,
}
