use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::db::models::{Lesson, NewLesson, UpdateLesson};

pub struct LessonRepository;

impl LessonRepository {
    pub async fn create(
        pool: &SqlitePool,
        course_id: i64,
        data: &NewLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO lessons (course_id, title, content, order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(course_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.order_index)
        .bind(OffsetDateTime::now_utc())
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid()).await
    }

    pub async fn get(pool: &SqlitePool, lesson_id: i64) -> Result<Lesson, sqlx::Error> {
        sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = ?1")
            .bind(lesson_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        lesson_id: i64,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = ?1")
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_course(
        pool: &SqlitePool,
        course_id: i64,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            "SELECT * FROM lessons WHERE course_id = ?1 ORDER BY order_index ASC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        lesson_id: i64,
        data: &UpdateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE lessons
            SET
                title = COALESCE(?1, title),
                content = COALESCE(?2, content),
                order_index = COALESCE(?3, order_index)
            WHERE id = ?4
            "#,
        )
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.order_index)
        .bind(lesson_id)
        .execute(pool)
        .await?;

        Self::get(pool, lesson_id).await
    }

    pub async fn delete<'e, E>(executor: E, lesson_id: i64) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query("DELETE FROM lessons WHERE id = ?1")
            .bind(lesson_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Explicit cascade used by course deletion; lessons are never removed
    /// implicitly by the store.
    pub async fn delete_for_course<'e, E>(executor: E, course_id: i64) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query("DELETE FROM lessons WHERE course_id = ?1")
            .bind(course_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
