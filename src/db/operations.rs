use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::db::models::{ProfilePatch, PublicUser, User};
use crate::error::{AppError, StorageError};
use crate::Result;

/// Durable record of accounts. Every operation is a single statement
/// against one row; sanitization happens here, so callers above this
/// boundary only ever see `PublicUser` unless they go through the raw
/// login-flow accessor.
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        // File-backed databases need their parent directory to exist
        if let Some(path) = file_path_of(url) {
            if let Some(parent) = Path::new(&path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Storage(StorageError::Connection(e.to_string())))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| AppError::Storage(StorageError::Connection(e.to_string())))?;

        Ok(Self { pool })
    }

    /// Create the users table if this is a fresh database.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                display_name TEXT NOT NULL DEFAULT '',
                bio TEXT NOT NULL DEFAULT '',
                avatar_url TEXT NOT NULL DEFAULT '',
                cover_photo_url TEXT NOT NULL DEFAULT '',
                interests TEXT NOT NULL DEFAULT '[]',
                score INTEGER NOT NULL DEFAULT 51,
                streak INTEGER NOT NULL DEFAULT 0,
                is_online INTEGER NOT NULL DEFAULT 0,
                location TEXT NOT NULL DEFAULT '',
                occupation TEXT NOT NULL DEFAULT '',
                financial_goals TEXT NOT NULL DEFAULT '[]',
                joined_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("User schema ready");
        Ok(())
    }

    /// Insert a fresh row. Duplicate emails surface as `AppError::Conflict`
    /// via the unique constraint; there is deliberately no prior existence
    /// read.
    pub async fn create(&self, user: &User) -> Result<PublicUser> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, email, password_hash, name, display_name, bio,
                avatar_url, cover_photo_url, interests, score, streak,
                is_online, location, occupation, financial_goals,
                joined_date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(&user.cover_photo_url)
        .bind(&user.interests)
        .bind(user.score)
        .bind(user.streak)
        .bind(user.is_online)
        .bind(&user.location)
        .bind(&user.occupation)
        .bind(&user.financial_goals)
        .bind(user.joined_date)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created.into())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<PublicUser>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user.map(Into::into))
    }

    /// Raw row including the password hash. Only the login flow should call
    /// this; everything else goes through the sanitized readers.
    pub async fn find_by_email_raw(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Public directory view, newest accounts first.
    pub async fn list(&self) -> Result<Vec<PublicUser>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Merge a patch over the row in one atomic UPDATE: unset fields keep
    /// their stored values via COALESCE. Returns None if the id is gone.
    pub async fn update_profile(&self, id: &str, patch: &ProfilePatch) -> Result<Option<PublicUser>> {
        let interests = patch.interests.as_ref().map(|v| encode_string_list(v));
        let financial_goals = patch.financial_goals.as_ref().map(|v| encode_string_list(v));

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                display_name = COALESCE(?, display_name),
                bio = COALESCE(?, bio),
                interests = COALESCE(?, interests),
                location = COALESCE(?, location),
                occupation = COALESCE(?, occupation),
                financial_goals = COALESCE(?, financial_goals),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.display_name)
        .bind(&patch.bio)
        .bind(interests)
        .bind(&patch.location)
        .bind(&patch.occupation)
        .bind(financial_goals)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(Into::into))
    }

    pub async fn update_avatar(&self, id: &str, url: &str) -> Result<Option<PublicUser>> {
        self.update_image_column("avatar_url", id, url).await
    }

    pub async fn update_cover_photo(&self, id: &str, url: &str) -> Result<Option<PublicUser>> {
        self.update_image_column("cover_photo_url", id, url).await
    }

    async fn update_image_column(&self, column: &str, id: &str, url: &str) -> Result<Option<PublicUser>> {
        // column is one of two fixed names, never caller input
        let sql = format!(
            "UPDATE users SET {column} = ?, updated_at = ? WHERE id = ? RETURNING *"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(url)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user.map(Into::into))
    }

    /// True iff a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn encode_string_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

// Extract the filesystem path from a sqlite url, if it has one
fn file_path_of(url: &str) -> Option<String> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    if rest.is_empty() || rest.starts_with(":memory:") {
        return None;
    }
    Some(rest.split('?').next().unwrap_or(rest).to_string())
}
