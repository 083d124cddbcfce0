use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::warn;

use crate::db::models::ProgressStatus;
use crate::db::repositories::{LessonRepository, ProgressRepository};
use crate::error::AppError;
use crate::services::{activity, assignment, notifier::Notifier};

/// Inclusive pass mark for quiz submissions.
pub const PASS_THRESHOLD: f64 = 80.0;

pub fn passes(score: f64) -> bool {
    score >= PASS_THRESHOLD
}

#[derive(Debug, Serialize)]
pub struct QuizOutcome {
    pub status: ProgressStatus,
    pub passed: bool,
    pub score: f64,
    /// Present when completing this course earned a follow-on assignment.
    pub auto_assignment: Option<assignment::Assignment>,
}

#[derive(Debug, Serialize)]
pub struct LessonOutcome {
    pub course_id: i64,
    pub percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct CompletionOutcome {
    pub status: ProgressStatus,
    pub auto_assignment: Option<assignment::Assignment>,
}

/// Applies a quiz score to a learner's course progress.
///
/// Score >= 80 completes the course and stamps `completion_date`; anything
/// lower moves it (back) to in_progress and clears the stamp. The learner
/// must already be enrolled. A transition into completed triggers
/// auto-assignment; chain failures are logged and dropped so the quiz
/// submission itself still succeeds.
pub async fn apply_quiz_score(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    user_id: i64,
    course_id: i64,
    score: f64,
) -> Result<QuizOutcome, AppError> {
    if !(0.0..=100.0).contains(&score) {
        return Err(AppError::Validation(format!(
            "score must be between 0 and 100, got {}",
            score
        )));
    }

    let existing = ProgressRepository::find(pool, user_id, course_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "user {} is not enrolled in course {}",
                user_id, course_id
            ))
        })?;

    let passed = passes(score);
    let (status, completion_date) = if passed {
        (ProgressStatus::Completed, Some(OffsetDateTime::now_utc()))
    } else {
        (ProgressStatus::InProgress, None)
    };

    ProgressRepository::set_quiz_result(pool, user_id, course_id, score, status, completion_date)
        .await?;

    activity::record(
        pool,
        Some(user_id),
        None,
        "quiz_submitted",
        &format!("course {} scored {:.1}, passed: {}", course_id, score, passed),
    )
    .await;

    let auto_assignment = if passed && existing.status != ProgressStatus::Completed {
        run_chain(pool, notifier, user_id, course_id).await
    } else {
        None
    };

    Ok(QuizOutcome {
        status,
        passed,
        score,
        auto_assignment,
    })
}

/// Marks one lesson complete and reports course completion as a rounded
/// percentage. Lesson progress never flips course-level status; that is
/// driven by quiz scores or an explicit course completion.
pub async fn apply_lesson_completion(
    pool: &SqlitePool,
    user_id: i64,
    lesson_id: i64,
) -> Result<LessonOutcome, AppError> {
    let lesson = LessonRepository::find_by_id(pool, lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("lesson {} not found", lesson_id)))?;

    ProgressRepository::upsert_lesson_completion(
        pool,
        user_id,
        lesson_id,
        OffsetDateTime::now_utc(),
    )
    .await?;

    let (completed, total) =
        ProgressRepository::lesson_completion_counts(pool, user_id, lesson.course_id).await?;

    activity::record(
        pool,
        Some(user_id),
        None,
        "lesson_completed",
        &format!("lesson {} of course {}", lesson_id, lesson.course_id),
    )
    .await;

    Ok(LessonOutcome {
        course_id: lesson.course_id,
        percentage: completion_percentage(completed, total),
    })
}

/// Explicit "complete course" action; same completion and chaining semantics
/// as a passing quiz, without touching the stored score.
pub async fn complete_course(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    user_id: i64,
    course_id: i64,
) -> Result<CompletionOutcome, AppError> {
    let existing = ProgressRepository::find(pool, user_id, course_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "user {} is not enrolled in course {}",
                user_id, course_id
            ))
        })?;

    ProgressRepository::mark_completed(pool, user_id, course_id, OffsetDateTime::now_utc())
        .await?;

    activity::record(
        pool,
        Some(user_id),
        None,
        "course_completed",
        &format!("course {}", course_id),
    )
    .await;

    let auto_assignment = if existing.status != ProgressStatus::Completed {
        run_chain(pool, notifier, user_id, course_id).await
    } else {
        None
    };

    Ok(CompletionOutcome {
        status: ProgressStatus::Completed,
        auto_assignment,
    })
}

/// Chain failures must never fail the primary operation; they are logged
/// and the chaining outcome is simply omitted.
async fn run_chain(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    user_id: i64,
    course_id: i64,
) -> Option<assignment::Assignment> {
    match assignment::maybe_chain(pool, notifier, user_id, course_id).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, user_id, course_id, "auto-assignment failed after completion");
            None
        }
    }
}

fn completion_percentage(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::{completion_percentage, passes};

    #[test]
    fn pass_boundary_is_inclusive_at_eighty() {
        assert!(!passes(79.0));
        assert!(!passes(79.9));
        assert!(passes(80.0));
        assert!(passes(100.0));
    }

    #[test]
    fn percentage_rounds_to_nearest_integer() {
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(3, 3), 100);
        assert_eq!(completion_percentage(0, 0), 0);
    }
}
