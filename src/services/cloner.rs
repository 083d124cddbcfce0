use std::collections::HashMap;

use sqlx::{Sqlite, Transaction};
use time::{Date, OffsetDateTime};

use crate::db::models::{Course, Lesson, Question, QuestionOption};
use crate::error::AppError;

/// Inputs for turning a template course into a dated, enrollable instance.
#[derive(Debug)]
pub struct CloneSpec<'a> {
    pub template_id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub title_override: Option<&'a str>,
    pub copy_questions: bool,
}

#[derive(Debug)]
pub struct ClonedCourse {
    pub course_id: i64,
    /// Source lesson id -> cloned lesson id, for re-linking child data.
    pub lesson_id_map: HashMap<i64, i64>,
}

/// Deep-copies a template course into a new non-template course row plus
/// copies of its lessons (and optionally its question bank), preserving
/// lesson order.
///
/// Runs entirely on the caller's transaction: any failed insert bubbles up
/// and the whole clone rolls back, so a partial clone never persists. Not
/// idempotent; scheduling the same template twice produces two courses.
pub async fn clone_course(
    tx: &mut Transaction<'_, Sqlite>,
    spec: CloneSpec<'_>,
) -> Result<ClonedCourse, AppError> {
    let source = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?1")
        .bind(spec.template_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {} not found", spec.template_id)))?;

    let title = spec.title_override.unwrap_or(&source.title);
    let now = OffsetDateTime::now_utc();

    let result = sqlx::query(
        r#"
        INSERT INTO courses (title, description, content, duration, required_hours, category,
                             status, is_template, is_locked, start_date, end_date,
                             max_attendees, instructor_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'published', 0, 0, ?7, ?8, ?9, ?10, ?11, ?11)
        "#,
    )
    .bind(title)
    .bind(blank_to_null(source.description))
    .bind(blank_to_null(source.content))
    .bind(blank_to_null(source.duration))
    .bind(source.required_hours)
    .bind(blank_to_null(source.category))
    .bind(spec.start_date)
    .bind(spec.end_date)
    .bind(source.max_attendees)
    .bind(source.instructor_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    let course_id = result.last_insert_rowid();

    let lessons = sqlx::query_as::<_, Lesson>(
        "SELECT * FROM lessons WHERE course_id = ?1 ORDER BY order_index ASC",
    )
    .bind(spec.template_id)
    .fetch_all(&mut **tx)
    .await?;

    let mut lesson_id_map = HashMap::with_capacity(lessons.len());
    for lesson in &lessons {
        let inserted = sqlx::query(
            r#"
            INSERT INTO lessons (course_id, title, content, order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(course_id)
        .bind(&lesson.title)
        .bind(blank_to_null(lesson.content.clone()))
        .bind(lesson.order_index)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        lesson_id_map.insert(lesson.id, inserted.last_insert_rowid());
    }

    if spec.copy_questions {
        copy_question_bank(tx, spec.template_id, course_id, &lesson_id_map).await?;
    }

    Ok(ClonedCourse {
        course_id,
        lesson_id_map,
    })
}

/// Copies course-level exam questions and per-lesson checkpoint questions,
/// re-linking the latter through the lesson id map.
async fn copy_question_bank(
    tx: &mut Transaction<'_, Sqlite>,
    source_course_id: i64,
    new_course_id: i64,
    lesson_id_map: &HashMap<i64, i64>,
) -> Result<(), AppError> {
    let course_questions =
        sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE course_id = ?1 ORDER BY id")
            .bind(source_course_id)
            .fetch_all(&mut **tx)
            .await?;
    for question in &course_questions {
        copy_question(tx, question, Some(new_course_id), None).await?;
    }

    for (source_lesson_id, new_lesson_id) in lesson_id_map {
        let lesson_questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE lesson_id = ?1 ORDER BY id",
        )
        .bind(source_lesson_id)
        .fetch_all(&mut **tx)
        .await?;
        for question in &lesson_questions {
            copy_question(tx, question, None, Some(*new_lesson_id)).await?;
        }
    }

    Ok(())
}

async fn copy_question(
    tx: &mut Transaction<'_, Sqlite>,
    source: &Question,
    course_id: Option<i64>,
    lesson_id: Option<i64>,
) -> Result<(), AppError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO questions (course_id, lesson_id, question_text, question_type, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(course_id)
    .bind(lesson_id)
    .bind(&source.question_text)
    .bind(&source.question_type)
    .bind(OffsetDateTime::now_utc())
    .execute(&mut **tx)
    .await?;
    let new_question_id = inserted.last_insert_rowid();

    let options = sqlx::query_as::<_, QuestionOption>(
        "SELECT * FROM question_options WHERE question_id = ?1 ORDER BY id",
    )
    .bind(source.id)
    .fetch_all(&mut **tx)
    .await?;
    for option in &options {
        sqlx::query(
            "INSERT INTO question_options (question_id, option_text, is_correct) VALUES (?1, ?2, ?3)",
        )
        .bind(new_question_id)
        .bind(&option.option_text)
        .bind(option.is_correct)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Empty-string fields are treated as semantically absent and stored as NULL.
fn blank_to_null(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::blank_to_null;

    #[test]
    fn blank_strings_become_null() {
        assert_eq!(blank_to_null(Some("".into())), None);
        assert_eq!(blank_to_null(Some("   ".into())), None);
        assert_eq!(blank_to_null(None), None);
    }

    #[test]
    fn non_blank_strings_pass_through() {
        assert_eq!(
            blank_to_null(Some("Workshop notes".into())),
            Some("Workshop notes".to_string())
        );
    }
}
