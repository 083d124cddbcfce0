use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config;
use crate::services::{dashboard::DashboardCache, notifier::Notifier};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub env: config::Config,
    pub notifier: Arc<dyn Notifier>,
    pub dashboard: Arc<DashboardCache>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        env: config::Config,
        notifier: Arc<dyn Notifier>,
        dashboard: Arc<DashboardCache>,
    ) -> Self {
        Self {
            db,
            env,
            notifier,
            dashboard,
        }
    }
}
