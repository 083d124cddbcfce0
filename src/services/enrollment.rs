use serde::Serialize;
use sqlx::SqlitePool;
use time::Date;
use tracing::debug;

use crate::db::repositories::{CourseRepository, ProgressRepository, UserRepository};
use crate::error::AppError;
use crate::services::{activity, notifier::Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollOutcome {
    Created,
    Rescheduled,
}

/// Creates or reschedules a learner's progress record for a course.
///
/// An existing (user, course) row is treated as a reschedule: only
/// `enrolled_at` moves, status is untouched. Capacity applies to fresh
/// enrollments only. The confirmation notification is best-effort.
pub async fn enroll(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    user_id: i64,
    course_id: i64,
    scheduled_date: Date,
) -> Result<EnrollOutcome, AppError> {
    let user = UserRepository::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;
    let course = CourseRepository::find_by_id(pool, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", course_id)))?;

    if course.is_template {
        return Err(AppError::Validation(
            "template courses are not enrollable".to_string(),
        ));
    }

    let existing = ProgressRepository::find(pool, user_id, course_id).await?;

    if existing.is_none() {
        if let Some(max) = course.max_attendees {
            let active = ProgressRepository::active_count(pool, course_id).await?;
            if active >= max {
                return Err(AppError::Conflict(format!(
                    "course '{}' is at capacity ({} attendees)",
                    course.title, max
                )));
            }
        }
    }

    ProgressRepository::upsert_enrollment(pool, user_id, course_id, scheduled_date).await?;

    let outcome = match existing {
        Some(_) => EnrollOutcome::Rescheduled,
        None => EnrollOutcome::Created,
    };

    let delivered = notifier
        .send(
            &user.email,
            "Course enrollment confirmed",
            &format!(
                "You are booked on '{}' starting {}.",
                course.title, scheduled_date
            ),
        )
        .await;
    debug!(delivered, user_id, course_id, "enrollment notification");

    let action = match outcome {
        EnrollOutcome::Created => "course_enrolled",
        EnrollOutcome::Rescheduled => "course_rescheduled",
    };
    activity::record(
        pool,
        Some(user_id),
        Some(&user.email),
        action,
        &format!("course '{}' scheduled for {}", course.title, scheduled_date),
    )
    .await;

    Ok(outcome)
}
