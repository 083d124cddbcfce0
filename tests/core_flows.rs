use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::Json;
use secrecy::SecretString;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use time::macros::date;
use time::Date;

use cpd_portal::app_state::AppState;
use cpd_portal::config::{AppConfig, Config, DatabaseConfig, Environment, ServerConfig};
use cpd_portal::db::models::{
    AccessLevel, CourseStatus, NewCourse, NewQuestion, NewQuestionOption, NewUser, ProgressStatus,
};
use cpd_portal::db::repositories::{
    CourseRepository, LessonRepository, ProgressRepository, QuestionRepository, UserRepository,
};
use cpd_portal::db::MIGRATOR;
use cpd_portal::error::AppError;
use cpd_portal::middleware::auth::AuthContext;
use cpd_portal::modules::courses::handlers;
use cpd_portal::services::dashboard::DashboardCache;
use cpd_portal::services::notifier::{InAppNotifier, Notifier};
use cpd_portal::services::{assignment, cloner, enrollment, progress};

async fn test_pool() -> SqlitePool {
    // One connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}

fn test_state(pool: &SqlitePool) -> AppState {
    let env = Config {
        server: ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
        },
        app: AppConfig {
            name: "cpd-portal-tests".to_string(),
            environment: Environment::Development,
            dashboard_cache_ttl_secs: 300,
        },
    };
    AppState::new(
        pool.clone(),
        env,
        Arc::new(InAppNotifier::new(pool.clone())),
        Arc::new(DashboardCache::new(Duration::from_secs(300))),
    )
}

fn admin_ctx() -> AuthContext {
    AuthContext {
        user_id: 1,
        access_level: AccessLevel::Admin,
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(String, String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        true
    }
}

async fn seed_user(pool: &SqlitePool, email: &str) -> i64 {
    let user = UserRepository::create(
        pool,
        &NewUser {
            email: email.to_string(),
            password: SecretString::new("correct horse battery staple".to_string()),
            access_level: Some(AccessLevel::User),
        },
    )
    .await
    .unwrap();
    user.id
}

async fn seed_course(pool: &SqlitePool, title: &str, is_template: bool) -> i64 {
    let course = CourseRepository::create(
        pool,
        &NewCourse {
            title: title.to_string(),
            description: Some("seeded".to_string()),
            content: None,
            duration: Some("1 day".to_string()),
            required_hours: Some(6.0),
            category: Some("compliance".to_string()),
            status: Some(CourseStatus::Published),
            is_template: Some(is_template),
            start_date: None,
            end_date: None,
            max_attendees: None,
            instructor_id: None,
        },
    )
    .await
    .unwrap();
    course.id
}

async fn seed_lesson(pool: &SqlitePool, course_id: i64, title: &str, order: i64) -> i64 {
    let lesson = LessonRepository::create(
        pool,
        course_id,
        &cpd_portal::db::models::NewLesson {
            title: title.to_string(),
            content: Some(format!("{} content", title)),
            order_index: order,
        },
    )
    .await
    .unwrap();
    lesson.id
}

async fn seed_question(
    pool: &SqlitePool,
    course_id: Option<i64>,
    lesson_id: Option<i64>,
    text: &str,
) -> i64 {
    let question = QuestionRepository::create_with_options(
        pool,
        &NewQuestion {
            course_id,
            lesson_id,
            question_text: text.to_string(),
            question_type: None,
            options: vec![
                NewQuestionOption {
                    option_text: "Right answer".to_string(),
                    is_correct: true,
                },
                NewQuestionOption {
                    option_text: "Wrong answer".to_string(),
                    is_correct: false,
                },
            ],
        },
    )
    .await
    .unwrap();
    question.question.id
}

async fn schedule(pool: &SqlitePool, template_id: i64, start: Date, end: Date) -> i64 {
    let mut tx = pool.begin().await.unwrap();
    let cloned = cloner::clone_course(
        &mut tx,
        cloner::CloneSpec {
            template_id,
            start_date: start,
            end_date: end,
            title_override: None,
            copy_questions: true,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    cloned.course_id
}

#[tokio::test]
async fn cloning_copies_lessons_and_questions_completely() {
    let pool = test_pool().await;

    let template_id = seed_course(&pool, "First Aid Refresher", true).await;
    let lesson_a = seed_lesson(&pool, template_id, "Bleeding control", 1).await;
    seed_lesson(&pool, template_id, "CPR basics", 2).await;
    seed_question(&pool, Some(template_id), None, "Exam question").await;
    seed_question(&pool, None, Some(lesson_a), "Checkpoint question").await;

    let new_id = schedule(&pool, template_id, date!(2026 - 09 - 07), date!(2026 - 09 - 08)).await;

    let course = CourseRepository::get(&pool, new_id).await.unwrap();
    assert!(!course.is_template);
    assert_eq!(course.status, CourseStatus::Published);
    assert_eq!(course.title, "First Aid Refresher");
    assert_eq!(course.start_date, Some(date!(2026 - 09 - 07)));
    assert_eq!(course.end_date, Some(date!(2026 - 09 - 08)));

    let lessons = LessonRepository::list_for_course(&pool, new_id).await.unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0].title, "Bleeding control");
    assert_eq!(lessons[0].order_index, 1);
    assert_eq!(lessons[1].title, "CPR basics");
    assert_eq!(lessons[1].order_index, 2);

    let exam = QuestionRepository::list_for_course(&pool, new_id).await.unwrap();
    assert_eq!(exam.len(), 1);
    assert_eq!(exam[0].question.question_text, "Exam question");
    assert_eq!(exam[0].options.len(), 2);
    assert!(exam[0].options.iter().any(|o| o.is_correct));

    let checkpoints = QuestionRepository::list_for_lesson(&pool, lessons[0].id)
        .await
        .unwrap();
    assert_eq!(checkpoints.len(), 1);
    assert_eq!(checkpoints[0].question.question_text, "Checkpoint question");
}

#[tokio::test]
async fn cloned_courses_are_isolated_from_their_template() {
    let pool = test_pool().await;

    let template_id = seed_course(&pool, "Manual Handling", true).await;
    seed_lesson(&pool, template_id, "Lifting technique", 1).await;

    let new_id = schedule(&pool, template_id, date!(2026 - 10 - 01), date!(2026 - 10 - 02)).await;

    // Growing the instance leaves the template untouched.
    seed_lesson(&pool, new_id, "Site-specific appendix", 2).await;
    let clone_lessons = LessonRepository::list_for_course(&pool, new_id).await.unwrap();
    let template_lessons = LessonRepository::list_for_course(&pool, template_id)
        .await
        .unwrap();
    assert_eq!(clone_lessons.len(), 2);
    assert_eq!(template_lessons.len(), 1);

    // Scheduling twice produces two distinct courses.
    let second_id = schedule(&pool, template_id, date!(2026 - 11 - 01), date!(2026 - 11 - 02)).await;
    assert_ne!(second_id, new_id);
}

#[tokio::test]
async fn re_enrollment_reschedules_without_duplicating_rows() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let course_id = seed_course(&pool, "Fire Safety", false).await;

    let first = enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 10))
        .await
        .unwrap();
    assert_eq!(first, enrollment::EnrollOutcome::Created);

    let second = enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 24))
        .await
        .unwrap();
    assert_eq!(second, enrollment::EnrollOutcome::Rescheduled);

    assert_eq!(
        ProgressRepository::count_for_pair(&pool, user_id, course_id)
            .await
            .unwrap(),
        1
    );
    let row = ProgressRepository::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.enrolled_at, date!(2026 - 09 - 24));
    assert_eq!(row.status, ProgressStatus::NotStarted);
    assert_eq!(notifier.sent().len(), 2);
}

#[tokio::test]
async fn templates_are_not_enrollable() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let template_id = seed_course(&pool, "Working at Height", true).await;

    let err = enrollment::enroll(&pool, &notifier, user_id, template_id, date!(2026 - 09 - 10))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn quiz_pass_boundary_sits_at_eighty_percent() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let course_id = seed_course(&pool, "COSHH Awareness", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let failed = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 79.0)
        .await
        .unwrap();
    assert!(!failed.passed);
    assert_eq!(failed.status, ProgressStatus::InProgress);

    let row = ProgressRepository::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ProgressStatus::InProgress);
    assert_eq!(row.score, Some(79.0));
    assert!(row.completion_date.is_none());

    let passed = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 80.0)
        .await
        .unwrap();
    assert!(passed.passed);
    assert_eq!(passed.status, ProgressStatus::Completed);

    let row = ProgressRepository::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ProgressStatus::Completed);
    assert_eq!(row.score, Some(80.0));
    assert!(row.completion_date.is_some());
}

#[tokio::test]
async fn failing_a_quiz_after_completion_reopens_the_course() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let course_id = seed_course(&pool, "Asbestos Awareness", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 95.0)
        .await
        .unwrap();
    let retake = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 40.0)
        .await
        .unwrap();
    assert_eq!(retake.status, ProgressStatus::InProgress);

    let row = ProgressRepository::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ProgressStatus::InProgress);
    assert!(row.completion_date.is_none());
    assert_eq!(row.score, Some(40.0));
}

#[tokio::test]
async fn out_of_range_scores_are_rejected_before_any_write() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let course_id = seed_course(&pool, "Noise at Work", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let err = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 101.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let row = ProgressRepository::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ProgressStatus::NotStarted);
    assert!(row.score.is_none());
}

#[tokio::test]
async fn quiz_without_enrollment_is_a_bad_request() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let course_id = seed_course(&pool, "Lone Working", false).await;

    let err = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 90.0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn passing_a_matching_course_chains_an_assessment() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let template_id = seed_course(&pool, "MOT Class 4 & 7 Annual Assessment", true).await;
    let template_lesson = seed_lesson(&pool, template_id, "Assessment briefing", 1).await;
    seed_question(&pool, None, Some(template_lesson), "Annual check question").await;

    let user_id = seed_user(&pool, "tester@example.com").await;
    let course_id = seed_course(&pool, "MOT Class 4 & 7 Training — Spring", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let outcome = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 85.0)
        .await
        .unwrap();

    let chained = outcome.auto_assignment.expect("assessment should chain");
    assert!(chained
        .course_title
        .starts_with("MOT Class 4 & 7 Annual Assessment - "));

    let assessment = CourseRepository::get(&pool, chained.course_id).await.unwrap();
    assert!(!assessment.is_template);
    assert_eq!(assessment.title, chained.course_title);

    // Learner is enrolled in the chained instance, lessons came along.
    let row = ProgressRepository::find(&pool, user_id, chained.course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ProgressStatus::NotStarted);
    let lessons = LessonRepository::list_for_course(&pool, chained.course_id)
        .await
        .unwrap();
    assert_eq!(lessons.len(), 1);
    let questions = QuestionRepository::list_for_lesson(&pool, lessons[0].id)
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);

    // Enrollment confirmation plus assignment notice.
    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].1, "New assessment assigned");
}

#[tokio::test]
async fn re_passing_a_completed_course_does_not_chain_again() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    seed_course(&pool, "MOT Class 1 & 2 Annual Assessment", true).await;
    let user_id = seed_user(&pool, "tester@example.com").await;
    let course_id = seed_course(&pool, "MOT Class 1 & 2 Training", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let first = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 90.0)
        .await
        .unwrap();
    assert!(first.auto_assignment.is_some());

    let second = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 95.0)
        .await
        .unwrap();
    assert!(second.auto_assignment.is_none());
}

#[tokio::test]
async fn unmatched_titles_complete_without_chaining() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let course_id = seed_course(&pool, "Safety 101", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let before = CourseRepository::list(&pool, None).await.unwrap().len();
    let outcome = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 92.5)
        .await
        .unwrap();
    assert!(outcome.passed);
    assert!(outcome.auto_assignment.is_none());

    // No extra course or enrollment appeared.
    let after = CourseRepository::list(&pool, None).await.unwrap().len();
    assert_eq!(before, after);
    let rows = ProgressRepository::list_for_user(&pool, user_id).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn missing_template_downgrades_chaining_to_a_no_op() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    // Matching rule, but no "MOT Class 4 & 7 Annual Assessment" template.
    let user_id = seed_user(&pool, "tester@example.com").await;
    let course_id = seed_course(&pool, "MOT Class 4 & 7 Training", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let outcome = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 88.0)
        .await
        .unwrap();
    assert!(outcome.passed);
    assert!(outcome.auto_assignment.is_none());
}

#[tokio::test]
async fn chaining_bypasses_the_capacity_limit() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let template = CourseRepository::create(
        &pool,
        &NewCourse {
            title: "MOT Class 1 & 2 Annual Assessment".to_string(),
            description: None,
            content: None,
            duration: None,
            required_hours: None,
            category: None,
            status: Some(CourseStatus::Published),
            is_template: Some(true),
            start_date: None,
            end_date: None,
            max_attendees: Some(0),
            instructor_id: None,
        },
    )
    .await
    .unwrap();

    let user_id = seed_user(&pool, "tester@example.com").await;
    let course_id = seed_course(&pool, "MOT Class 1 & 2 Training", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    // max_attendees copies onto the clone, yet the system enrollment lands.
    let outcome = assignment::maybe_chain(&pool, &notifier, user_id, course_id)
        .await
        .unwrap()
        .expect("assessment should chain");
    let clone = CourseRepository::get(&pool, outcome.course_id).await.unwrap();
    assert_eq!(clone.max_attendees, template.max_attendees);
    assert!(ProgressRepository::find(&pool, user_id, outcome.course_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn full_courses_reject_new_learners_but_allow_reschedules() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let course = CourseRepository::create(
        &pool,
        &NewCourse {
            title: "Confined Spaces".to_string(),
            description: None,
            content: None,
            duration: None,
            required_hours: None,
            category: None,
            status: Some(CourseStatus::Published),
            is_template: Some(false),
            start_date: None,
            end_date: None,
            max_attendees: Some(1),
            instructor_id: None,
        },
    )
    .await
    .unwrap();

    let first_user = seed_user(&pool, "first@example.com").await;
    let second_user = seed_user(&pool, "second@example.com").await;

    enrollment::enroll(&pool, &notifier, first_user, course.id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let err = enrollment::enroll(&pool, &notifier, second_user, course.id, date!(2026 - 09 - 01))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The enrolled learner can still move their own booking.
    let outcome = enrollment::enroll(&pool, &notifier, first_user, course.id, date!(2026 - 09 - 15))
        .await
        .unwrap();
    assert_eq!(outcome, enrollment::EnrollOutcome::Rescheduled);
}

#[tokio::test]
async fn lesson_completion_reports_rounded_course_percentage() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    let user_id = seed_user(&pool, "learner@example.com").await;
    let course_id = seed_course(&pool, "Risk Assessment Basics", false).await;
    let lesson_a = seed_lesson(&pool, course_id, "Hazard spotting", 1).await;
    let lesson_b = seed_lesson(&pool, course_id, "Scoring risk", 2).await;
    seed_lesson(&pool, course_id, "Controls", 3).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let one = progress::apply_lesson_completion(&pool, user_id, lesson_a).await.unwrap();
    assert_eq!(one.percentage, 33);

    // Completing the same lesson again is idempotent.
    let again = progress::apply_lesson_completion(&pool, user_id, lesson_a).await.unwrap();
    assert_eq!(again.percentage, 33);

    let two = progress::apply_lesson_completion(&pool, user_id, lesson_b).await.unwrap();
    assert_eq!(two.percentage, 67);

    // Lesson progress never flips the course itself.
    let row = ProgressRepository::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ProgressStatus::NotStarted);
}

#[tokio::test]
async fn explicit_completion_mirrors_a_passing_quiz() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();

    seed_course(&pool, "MOT Class 4 & 7 Annual Assessment", true).await;
    let user_id = seed_user(&pool, "tester@example.com").await;
    let course_id = seed_course(&pool, "MOT Class 4 & 7 Training", false).await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let outcome = progress::complete_course(&pool, &notifier, user_id, course_id)
        .await
        .unwrap();
    assert_eq!(outcome.status, ProgressStatus::Completed);
    assert!(outcome.auto_assignment.is_some());

    let row = ProgressRepository::find(&pool, user_id, course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ProgressStatus::Completed);
    // Explicit completion never invents a score.
    assert!(row.score.is_none());
}

#[tokio::test]
async fn question_create_enforces_parent_and_correct_option_invariants() {
    let pool = test_pool().await;
    let state = test_state(&pool);

    let course_id = seed_course(&pool, "Electrical Safety", false).await;
    let lesson_id = seed_lesson(&pool, course_id, "Isolation procedure", 1).await;

    let correct = || NewQuestionOption {
        option_text: "Lock off first".to_string(),
        is_correct: true,
    };
    let wrong = || NewQuestionOption {
        option_text: "Just be careful".to_string(),
        is_correct: false,
    };
    let body = |course: Option<i64>, lesson: Option<i64>, options: Vec<NewQuestionOption>| {
        Json(NewQuestion {
            course_id: course,
            lesson_id: lesson,
            question_text: "What comes before working on the circuit?".to_string(),
            question_type: None,
            options,
        })
    };

    // A question cannot belong to both a course and a lesson.
    let err = handlers::create_question(
        State(state.clone()),
        admin_ctx(),
        Path(course_id),
        body(Some(course_id), Some(lesson_id), vec![correct(), wrong()]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // At least one option must be marked correct.
    let err = handlers::create_question(
        State(state.clone()),
        admin_ctx(),
        Path(course_id),
        body(None, Some(lesson_id), vec![wrong(), wrong()]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // An empty option list fails DTO validation outright.
    let err = handlers::create_question(
        State(state.clone()),
        admin_ctx(),
        Path(course_id),
        body(None, None, vec![]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Rejected attempts stored nothing.
    assert!(QuestionRepository::list_for_course(&pool, course_id)
        .await
        .unwrap()
        .is_empty());
    assert!(QuestionRepository::list_for_lesson(&pool, lesson_id)
        .await
        .unwrap()
        .is_empty());

    // A well-formed body with neither parent defaults to the path course.
    let created = handlers::create_question(
        State(state),
        admin_ctx(),
        Path(course_id),
        body(None, None, vec![correct(), wrong()]),
    )
    .await
    .unwrap();
    assert_eq!(created.0.question.course_id, Some(course_id));
    assert_eq!(created.0.question.lesson_id, None);
}

#[tokio::test]
async fn course_deletion_cascades_over_lessons_and_questions() {
    let pool = test_pool().await;
    let state = test_state(&pool);

    let course_id = seed_course(&pool, "Scaffold Inspection", false).await;
    let lesson_id = seed_lesson(&pool, course_id, "Tagging", 1).await;
    seed_question(&pool, Some(course_id), None, "Exam question").await;
    seed_question(&pool, None, Some(lesson_id), "Checkpoint question").await;

    handlers::delete_course(State(state), admin_ctx(), Path(course_id))
        .await
        .unwrap();

    assert!(CourseRepository::find_by_id(&pool, course_id)
        .await
        .unwrap()
        .is_none());
    assert!(LessonRepository::list_for_course(&pool, course_id)
        .await
        .unwrap()
        .is_empty());
    assert!(QuestionRepository::list_for_course(&pool, course_id)
        .await
        .unwrap()
        .is_empty());
    assert!(QuestionRepository::list_for_lesson(&pool, lesson_id)
        .await
        .unwrap()
        .is_empty());
    let orphaned_options = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM question_options")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphaned_options, 0);
}

#[tokio::test]
async fn dashboard_cache_is_per_user_and_serves_concurrent_loads() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();
    let dashboard = DashboardCache::new(Duration::from_secs(300));

    let first = seed_user(&pool, "first@example.com").await;
    let second = seed_user(&pool, "second@example.com").await;
    let course_id = seed_course(&pool, "Ladder Safety", false).await;
    enrollment::enroll(&pool, &notifier, first, course_id, date!(2026 - 09 - 01))
        .await
        .unwrap();

    let (first_summary, second_summary) = tokio::join!(
        dashboard.get_or_load(&pool, first),
        dashboard.get_or_load(&pool, second)
    );
    let first_summary = first_summary.unwrap();
    let second_summary = second_summary.unwrap();
    assert_eq!(first_summary.total_courses, 1);
    assert_eq!(second_summary.total_courses, 0);

    // Invalidating one user leaves the other's entry cached.
    dashboard.invalidate(first).await;
    let second_again = dashboard.get_or_load(&pool, second).await.unwrap();
    assert_eq!(second_again.generated_at, second_summary.generated_at);
}

#[tokio::test]
async fn safety_101_journey_from_template_to_completed_dashboard() {
    let pool = test_pool().await;
    let notifier = RecordingNotifier::default();
    let dashboard = DashboardCache::new(Duration::from_secs(300));

    // Admin authors a template and schedules it for September.
    let template_id = seed_course(&pool, "Safety 101", true).await;
    seed_lesson(&pool, template_id, "Induction", 1).await;
    seed_lesson(&pool, template_id, "Site rules", 2).await;
    seed_question(&pool, Some(template_id), None, "Final exam question").await;
    let course_id = schedule(&pool, template_id, date!(2026 - 09 - 07), date!(2026 - 09 - 11)).await;

    // Learner books on and works through the lessons.
    let user_id = seed_user(&pool, "newstarter@example.com").await;
    enrollment::enroll(&pool, &notifier, user_id, course_id, date!(2026 - 09 - 07))
        .await
        .unwrap();

    let lessons = LessonRepository::list_for_course(&pool, course_id).await.unwrap();
    let halfway = progress::apply_lesson_completion(&pool, user_id, lessons[0].id)
        .await
        .unwrap();
    assert_eq!(halfway.percentage, 50);
    let done = progress::apply_lesson_completion(&pool, user_id, lessons[1].id)
        .await
        .unwrap();
    assert_eq!(done.percentage, 100);

    // First exam attempt falls short, the retake passes.
    let attempt = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 70.0)
        .await
        .unwrap();
    assert!(!attempt.passed);
    let retake = progress::apply_quiz_score(&pool, &notifier, user_id, course_id, 90.0)
        .await
        .unwrap();
    assert!(retake.passed);
    assert!(retake.auto_assignment.is_none());

    // Dashboard reflects the completion; the cache serves repeat reads.
    dashboard.invalidate(user_id).await;
    let summary = dashboard.get_or_load(&pool, user_id).await.unwrap();
    assert_eq!(summary.total_courses, 1);
    assert_eq!(summary.completed_courses, 1);
    assert_eq!(summary.courses[0].title, "Safety 101");
    assert_eq!(summary.courses[0].score, Some(90.0));

    let cached = dashboard.get_or_load(&pool, user_id).await.unwrap();
    assert_eq!(cached.generated_at, summary.generated_at);
}
