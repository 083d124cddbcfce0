use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Published,
}

/// A course row. Template courses (`is_template = true`) are never directly
/// enrollable; they exist only as sources for scheduled instances.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub duration: Option<String>,
    pub required_hours: Option<f64>,
    pub category: Option<String>,
    pub status: CourseStatus,
    pub is_template: bool,
    pub is_locked: bool,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub max_attendees: Option<i64>,
    pub instructor_id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub duration: Option<String>,
    pub required_hours: Option<f64>,
    pub category: Option<String>,
    pub status: Option<CourseStatus>,
    pub is_template: Option<bool>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub max_attendees: Option<i64>,
    pub instructor_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourse {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub duration: Option<String>,
    pub required_hours: Option<f64>,
    pub category: Option<String>,
    pub status: Option<CourseStatus>,
    pub is_locked: Option<bool>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub max_attendees: Option<i64>,
    pub instructor_id: Option<i64>,
}

/// Request body for scheduling a template into a dated instance.
#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleCourseRequest {
    pub start_date: Date,
    pub end_date: Date,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub copy_questions: Option<bool>,
}
