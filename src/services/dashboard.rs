use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::SqlitePool;
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;

use crate::db::models::ProgressStatus;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardCourse {
    pub course_id: i64,
    pub title: String,
    pub status: ProgressStatus,
    pub score: Option<f64>,
    pub enrolled_at: Date,
    pub completion_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub user_id: i64,
    pub total_courses: usize,
    pub completed_courses: usize,
    pub courses: Vec<DashboardCourse>,
    pub generated_at: OffsetDateTime,
}

struct CacheEntry {
    stored_at: Instant,
    summary: DashboardSummary,
}

/// Memoization wrapper around the dashboard read query, keyed by user id.
/// Entries expire after the configured TTL; mutating handlers invalidate
/// eagerly so learners see fresh state after their own actions.
pub struct DashboardCache {
    ttl: Duration,
    entries: Mutex<HashMap<i64, CacheEntry>>,
}

impl DashboardCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_load(
        &self,
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<DashboardSummary, AppError> {
        {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(&user_id) {
                if entry.stored_at.elapsed() < self.ttl {
                    return Ok(entry.summary.clone());
                }
            }
        }

        // The lock is not held across the query; one slow load must not
        // stall every other user's dashboard.
        let summary = load_summary(pool, user_id).await?;
        self.entries.lock().await.insert(
            user_id,
            CacheEntry {
                stored_at: Instant::now(),
                summary: summary.clone(),
            },
        );
        Ok(summary)
    }

    pub async fn invalidate(&self, user_id: i64) {
        self.entries.lock().await.remove(&user_id);
    }
}

async fn load_summary(pool: &SqlitePool, user_id: i64) -> Result<DashboardSummary, AppError> {
    let courses = sqlx::query_as::<_, DashboardCourse>(
        r#"
        SELECT c.id AS course_id, c.title, p.status, p.score, p.enrolled_at, p.completion_date
        FROM user_course_progress p
        JOIN courses c ON c.id = p.course_id
        WHERE p.user_id = ?1
        ORDER BY p.enrolled_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let completed = courses
        .iter()
        .filter(|c| c.status == ProgressStatus::Completed)
        .count();

    Ok(DashboardSummary {
        user_id,
        total_courses: courses.len(),
        completed_courses: completed,
        courses,
        generated_at: OffsetDateTime::now_utc(),
    })
}
