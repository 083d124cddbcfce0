use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use validator::Validate;

/// Lifecycle of a learner against a course or lesson.
///
/// `cancelled` is referenced by capacity counting but never set by any
/// application flow; it is carried so externally-cancelled rows stay out of
/// capacity counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
}

/// At most one row per (user, course), backed by a unique constraint and
/// conflict-handling upserts.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct UserCourseProgress {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub status: ProgressStatus,
    pub enrolled_at: Date,
    pub completion_date: Option<OffsetDateTime>,
    pub score: Option<f64>,
    pub hours_completed: f64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct UserLessonProgress {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    pub status: ProgressStatus,
    pub completion_date: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollRequest {
    pub user_id: i64,
    pub course_id: i64,
    pub scheduled_date: Date,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuizScoreRequest {
    pub course_id: i64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub score: f64,
}
