use sqlx::{Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use crate::db::models::{NewQuestion, Question, QuestionOption, QuestionWithOptions};

pub struct QuestionRepository;

impl QuestionRepository {
    /// Inserts a question and all of its options in one transaction; a
    /// failing option insert leaves no partial question behind.
    pub async fn create_with_options(
        pool: &SqlitePool,
        data: &NewQuestion,
    ) -> Result<QuestionWithOptions, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO questions (course_id, lesson_id, question_text, question_type, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(data.course_id)
        .bind(data.lesson_id)
        .bind(&data.question_text)
        .bind(data.question_type.as_deref().unwrap_or("multiple_choice"))
        .bind(OffsetDateTime::now_utc())
        .execute(&mut *tx)
        .await?;
        let question_id = result.last_insert_rowid();

        for option in &data.options {
            sqlx::query(
                "INSERT INTO question_options (question_id, option_text, is_correct) VALUES (?1, ?2, ?3)",
            )
            .bind(question_id)
            .bind(&option.option_text)
            .bind(option.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::get_with_options(pool, question_id).await
    }

    pub async fn get_with_options(
        pool: &SqlitePool,
        question_id: i64,
    ) -> Result<QuestionWithOptions, sqlx::Error> {
        let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = ?1")
            .bind(question_id)
            .fetch_one(pool)
            .await?;
        let options = Self::options_for(pool, question_id).await?;
        Ok(QuestionWithOptions { question, options })
    }

    pub async fn options_for(
        pool: &SqlitePool,
        question_id: i64,
    ) -> Result<Vec<QuestionOption>, sqlx::Error> {
        sqlx::query_as::<_, QuestionOption>(
            "SELECT * FROM question_options WHERE question_id = ?1 ORDER BY id ASC",
        )
        .bind(question_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_for_course(
        pool: &SqlitePool,
        course_id: i64,
    ) -> Result<Vec<QuestionWithOptions>, sqlx::Error> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE course_id = ?1 ORDER BY id ASC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        let mut out = Vec::with_capacity(questions.len());
        for question in questions {
            let options = Self::options_for(pool, question.id).await?;
            out.push(QuestionWithOptions { question, options });
        }
        Ok(out)
    }

    pub async fn list_for_lesson(
        pool: &SqlitePool,
        lesson_id: i64,
    ) -> Result<Vec<QuestionWithOptions>, sqlx::Error> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE lesson_id = ?1 ORDER BY id ASC",
        )
        .bind(lesson_id)
        .fetch_all(pool)
        .await?;

        let mut out = Vec::with_capacity(questions.len());
        for question in questions {
            let options = Self::options_for(pool, question.id).await?;
            out.push(QuestionWithOptions { question, options });
        }
        Ok(out)
    }

    /// Explicit cascade used by course deletion: removes course-level
    /// questions and every question attached to one of the course's lessons,
    /// options first. Runs on the caller's transaction so a partial cascade
    /// never persists.
    pub async fn delete_for_course(
        tx: &mut Transaction<'_, Sqlite>,
        course_id: i64,
    ) -> Result<u64, sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM question_options WHERE question_id IN (
                SELECT id FROM questions
                WHERE course_id = ?1
                   OR lesson_id IN (SELECT id FROM lessons WHERE course_id = ?1)
            )
            "#,
        )
        .bind(course_id)
        .execute(&mut **tx)
        .await?;
        let result = sqlx::query(
            r#"
            DELETE FROM questions
            WHERE course_id = ?1
               OR lesson_id IN (SELECT id FROM lessons WHERE course_id = ?1)
            "#,
        )
        .bind(course_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_lesson(
        tx: &mut Transaction<'_, Sqlite>,
        lesson_id: i64,
    ) -> Result<u64, sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM question_options WHERE question_id IN (
                SELECT id FROM questions WHERE lesson_id = ?1
            )
            "#,
        )
        .bind(lesson_id)
        .execute(&mut **tx)
        .await?;
        let result = sqlx::query("DELETE FROM questions WHERE lesson_id = ?1")
            .bind(lesson_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &SqlitePool, question_id: i64) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM question_options WHERE question_id = ?1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
