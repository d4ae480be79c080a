use chrono::{Duration, Utc};
use sqlx::FromRow;

use super::Database;
use crate::security::{generate_token, hash_token, Actor};
use crate::content::Role;
use crate::Result;

/// Repository for login sessions
pub struct SessionRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct SessionActorRow {
    user_id: i64,
    display_name: String,
    role: String,
}

impl<'a> SessionRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Open a session for a user and return the raw session token
    pub async fn create(&self, user_id: i64, lifetime_secs: u64) -> Result<String> {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(lifetime_secs as i64);

        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(self.db.pool())
        .await?;

        Ok(token)
    }

    /// Resolve an unexpired session token to the acting user
    pub async fn find_actor(&self, token: &str) -> Result<Option<Actor>> {
        let row: Option<SessionActorRow> = sqlx::query_as(
            r#"
            SELECT u.id AS user_id, u.display_name, u.role
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = ? AND s.expires_at > ?
            "#,
        )
        .bind(hash_token(token))
        .bind(Utc::now())
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| Actor {
            user_id: row.user_id,
            display_name: row.display_name,
            role: Role::parse(&row.role),
            session: token.to_string(),
        }))
    }

    /// End a session
    pub async fn delete(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove expired sessions
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
