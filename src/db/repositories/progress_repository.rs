use sqlx::SqlitePool;
use time::{Date, OffsetDateTime};

use crate::db::models::{ProgressStatus, UserCourseProgress, UserLessonProgress};

pub struct ProgressRepository;

impl ProgressRepository {
    pub async fn find(
        pool: &SqlitePool,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<UserCourseProgress>, sqlx::Error> {
        sqlx::query_as::<_, UserCourseProgress>(
            "SELECT * FROM user_course_progress WHERE user_id = ?1 AND course_id = ?2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<UserCourseProgress>, sqlx::Error> {
        sqlx::query_as::<_, UserCourseProgress>(
            "SELECT * FROM user_course_progress WHERE user_id = ?1 ORDER BY enrolled_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_pair(
        pool: &SqlitePool,
        user_id: i64,
        course_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_course_progress WHERE user_id = ?1 AND course_id = ?2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Live count of non-cancelled progress rows, used for capacity checks.
    pub async fn active_count(pool: &SqlitePool, course_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_course_progress WHERE course_id = ?1 AND status != 'cancelled'",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Atomic enroll-or-reschedule riding the (user_id, course_id) unique
    /// constraint: a fresh row starts `not_started`, an existing row only has
    /// its enrolled_at moved, status untouched.
    pub async fn upsert_enrollment<'e, E>(
        executor: E,
        user_id: i64,
        course_id: i64,
        scheduled_date: Date,
    ) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_course_progress (user_id, course_id, status, enrolled_at, hours_completed)
            VALUES (?1, ?2, 'not_started', ?3, 0)
            ON CONFLICT (user_id, course_id)
            DO UPDATE SET enrolled_at = excluded.enrolled_at
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(scheduled_date)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_quiz_result(
        pool: &SqlitePool,
        user_id: i64,
        course_id: i64,
        score: f64,
        status: ProgressStatus,
        completion_date: Option<OffsetDateTime>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE user_course_progress
            SET status = ?1, score = ?2, completion_date = ?3
            WHERE user_id = ?4 AND course_id = ?5
            "#,
        )
        .bind(status)
        .bind(score)
        .bind(completion_date)
        .bind(user_id)
        .bind(course_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_completed(
        pool: &SqlitePool,
        user_id: i64,
        course_id: i64,
        completion_date: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE user_course_progress
            SET status = 'completed', completion_date = ?1
            WHERE user_id = ?2 AND course_id = ?3
            "#,
        )
        .bind(completion_date)
        .bind(user_id)
        .bind(course_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_lesson_completion(
        pool: &SqlitePool,
        user_id: i64,
        lesson_id: i64,
        completion_date: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_lesson_progress (user_id, lesson_id, status, completion_date)
            VALUES (?1, ?2, 'completed', ?3)
            ON CONFLICT (user_id, lesson_id)
            DO UPDATE SET status = 'completed', completion_date = excluded.completion_date
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(completion_date)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_lesson_progress(
        pool: &SqlitePool,
        user_id: i64,
        lesson_id: i64,
    ) -> Result<Option<UserLessonProgress>, sqlx::Error> {
        sqlx::query_as::<_, UserLessonProgress>(
            "SELECT * FROM user_lesson_progress WHERE user_id = ?1 AND lesson_id = ?2",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
    }

    /// (completed, total) lesson counts for a user against one course.
    pub async fn lesson_completion_counts(
        pool: &SqlitePool,
        user_id: i64,
        course_id: i64,
    ) -> Result<(i64, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lessons WHERE course_id = ?1",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await?;

        let completed = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_lesson_progress ulp
            JOIN lessons l ON l.id = ulp.lesson_id
            WHERE ulp.user_id = ?1 AND l.course_id = ?2 AND ulp.status = 'completed'
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;

        Ok((completed, total))
    }
}
