use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::db::models::{Course, CourseStatus, NewCourse, UpdateCourse};

pub struct CourseRepository;

impl CourseRepository {
    pub async fn create(pool: &SqlitePool, data: &NewCourse) -> Result<Course, sqlx::Error> {
        let now = OffsetDateTime::now_utc();
        let result = sqlx::query(
            r#"
            INSERT INTO courses (title, description, content, duration, required_hours, category,
                                 status, is_template, is_locked, start_date, end_date,
                                 max_attendees, instructor_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12, ?13, ?13)
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.content)
        .bind(&data.duration)
        .bind(data.required_hours)
        .bind(&data.category)
        .bind(data.status.unwrap_or(CourseStatus::Draft))
        .bind(data.is_template.unwrap_or(false))
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.max_attendees)
        .bind(data.instructor_id)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid()).await
    }

    pub async fn get(pool: &SqlitePool, course_id: i64) -> Result<Course, sqlx::Error> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?1")
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        course_id: i64,
    ) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?1")
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Exact-title lookup among template courses, used by auto-assignment.
    pub async fn find_template_by_title(
        pool: &SqlitePool,
        title: &str,
    ) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE title = ?1 AND is_template = 1",
        )
        .bind(title)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(
        pool: &SqlitePool,
        is_template: Option<bool>,
    ) -> Result<Vec<Course>, sqlx::Error> {
        match is_template {
            Some(flag) => {
                sqlx::query_as::<_, Course>(
                    "SELECT * FROM courses WHERE is_template = ?1 ORDER BY created_at DESC",
                )
                .bind(flag)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn update(
        pool: &SqlitePool,
        course_id: i64,
        data: &UpdateCourse,
    ) -> Result<Course, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE courses
            SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                content = COALESCE(?3, content),
                duration = COALESCE(?4, duration),
                required_hours = COALESCE(?5, required_hours),
                category = COALESCE(?6, category),
                status = COALESCE(?7, status),
                is_locked = COALESCE(?8, is_locked),
                start_date = COALESCE(?9, start_date),
                end_date = COALESCE(?10, end_date),
                max_attendees = COALESCE(?11, max_attendees),
                instructor_id = COALESCE(?12, instructor_id),
                updated_at = ?13
            WHERE id = ?14
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.content)
        .bind(&data.duration)
        .bind(data.required_hours)
        .bind(&data.category)
        .bind(data.status)
        .bind(data.is_locked)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.max_attendees)
        .bind(data.instructor_id)
        .bind(OffsetDateTime::now_utc())
        .bind(course_id)
        .execute(pool)
        .await?;

        Self::get(pool, course_id).await
    }

    pub async fn delete<'e, E>(executor: E, course_id: i64) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(course_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
