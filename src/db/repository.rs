//! Repository module for user persistence
//!
//! Defines the [`UserStore`] trait used by the social graph and the
//! PostgreSQL implementation. Follower and following lists live in
//! `BIGINT[]` columns on the `users` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use thiserror::Error;

use crate::models::{NewUser, User};

/// Repository-related errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::StoreUnavailable(e.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::EmailAlreadyExists
            }
            _ => StoreError::DatabaseError(e.to_string()),
        }
    }
}

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for users and their follow relationships
///
/// Follow edges are stored on both sides: `follower.following` and
/// `followee.followers` are always updated together.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user with empty follower/following lists
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Find a user and its password hash by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<(User, String)>>;

    /// Record that `follower` follows `followee`; no-op if already recorded
    ///
    /// Fails with [`StoreError::UserNotFound`] if either user does not exist.
    async fn add_follow(&self, follower: i64, followee: i64) -> StoreResult<()>;

    /// Drop the edge `follower -> followee`; no-op if absent
    ///
    /// Fails with [`StoreError::UserNotFound`] if either user does not exist.
    async fn remove_follow(&self, follower: i64, followee: i64) -> StoreResult<()>;

    /// Check that the store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

const USER_COLUMNS: &str =
    "id, username, email, bio, avatar, followers, following, created_at";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get::<i64, _>("id"),
        username: row.get::<String, _>("username"),
        email: row.get::<String, _>("email"),
        bio: row.get::<Option<String>, _>("bio"),
        avatar: row.get::<Option<String>, _>("avatar"),
        followers: row.get::<Vec<i64>, _>("followers"),
        following: row.get::<Vec<i64>, _>("following"),
        created_at: row.get::<DateTime<Utc>, _>("created_at").to_rfc3339(),
    }
}

/// PostgreSQL implementation of [`UserStore`]
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock both user rows for the rest of the transaction
    ///
    /// Rows are locked in ID order so concurrent edges between the same pair
    /// cannot deadlock.
    async fn lock_pair(
        tx: &mut Transaction<'_, Postgres>,
        first: i64,
        second: i64,
    ) -> StoreResult<()> {
        let ids: Vec<i64> = sqlx::query("SELECT id FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(vec![first, second])
            .fetch_all(&mut **tx)
            .await?
            .iter()
            .map(|row| row.get::<i64, _>("id"))
            .collect();

        for id in [first, second] {
            if !ids.contains(&id) {
                return Err(StoreError::UserNotFound(id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(&row))
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<(User, String)>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| (user_from_row(&row), row.get::<String, _>("password_hash"))))
    }

    async fn add_follow(&self, follower: i64, followee: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::lock_pair(&mut tx, follower, followee).await?;

        sqlx::query(
            r#"
            UPDATE users SET following = array_append(following, $2)
            WHERE id = $1 AND NOT ($2 = ANY(following))
            "#,
        )
        .bind(follower)
        .bind(followee)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users SET followers = array_append(followers, $1)
            WHERE id = $2 AND NOT ($1 = ANY(followers))
            "#,
        )
        .bind(follower)
        .bind(followee)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_follow(&self, follower: i64, followee: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::lock_pair(&mut tx, follower, followee).await?;

        sqlx::query("UPDATE users SET following = array_remove(following, $2) WHERE id = $1")
            .bind(follower)
            .bind(followee)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET followers = array_remove(followers, $1) WHERE id = $2")
            .bind(follower)
            .bind(followee)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
