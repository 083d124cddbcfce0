pub mod models;
pub mod repositories;

mod error;

use anyhow::Result;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config;

pub use error::DatabaseError;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Initialize the database connection pool and apply pending migrations.
pub async fn init_pool() -> Result<SqlitePool> {
    let config = config::get();

    let options =
        SqliteConnectOptions::from_str(&config.database.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections.unwrap_or(5))
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
