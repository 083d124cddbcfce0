use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: Option<String>,
    /// Display/traversal order within the course. Unique per course by
    /// convention; gaps are allowed.
    pub order_index: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewLesson {
    #[validate(length(min = 1))]
    pub title: String,
    pub content: Option<String>,
    pub order_index: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLesson {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub order_index: Option<i64>,
}
