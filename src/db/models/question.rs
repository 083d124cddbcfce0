use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

/// A question belongs either to a lesson checkpoint or to a course-level
/// exam: exactly one of `course_id` / `lesson_id` is set.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub course_id: Option<i64>,
    pub lesson_id: Option<i64>,
    pub question_text: String,
    pub question_type: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
    pub is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewQuestion {
    pub course_id: Option<i64>,
    pub lesson_id: Option<i64>,
    #[validate(length(min = 1))]
    pub question_text: String,
    pub question_type: Option<String>,
    #[validate(length(min = 1), nested)]
    pub options: Vec<NewQuestionOption>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewQuestionOption {
    #[validate(length(min = 1))]
    pub option_text: String,
    pub is_correct: bool,
}

/// A question joined with its options, as returned by read endpoints.
#[derive(Debug, Serialize)]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<QuestionOption>,
}
