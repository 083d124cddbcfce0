use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::db::models::{AccessLevel, NewUser, User};

pub struct UserRepository;

impl UserRepository {
    pub async fn create(pool: &SqlitePool, data: &NewUser) -> Result<User, sqlx::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(data.password.expose_secret().as_bytes(), &salt)
            .map_err(|e| sqlx::Error::Protocol(format!("Password hashing failed: {}", e)))?
            .to_string();

        let now = OffsetDateTime::now_utc();
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, access_level, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(data.email.to_lowercase())
        .bind(password_hash)
        .bind(data.access_level.unwrap_or(AccessLevel::User))
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid()).await
    }

    pub async fn get(pool: &SqlitePool, user_id: i64) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY email ASC")
            .fetch_all(pool)
            .await
    }
}
