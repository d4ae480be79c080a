use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::Database;
use crate::content::{NewUser, Role, User};
use crate::security::{generate_token, hash_token};
use crate::{Error, Result};

/// Repository for site users
pub struct UserRepository<'a> {
    db: &'a Database,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    login: String,
    display_name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = Role::parse(&row.role).ok_or_else(|| Error::InvalidRole(row.role.clone()))?;
        Ok(User {
            id: row.id,
            login: row.login,
            display_name: row.display_name,
            email: row.email,
            role,
            created_at: row.created_at,
        })
    }
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a user and return it with its login token.
    ///
    /// The raw token is only available here; the database keeps its hash.
    pub async fn create(&self, new_user: &NewUser) -> Result<(User, String)> {
        let token = generate_token();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (login, display_name, email, role, token_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_user.login)
        .bind(&new_user.display_name)
        .bind(&new_user.email)
        .bind(new_user.role.as_str())
        .bind(hash_token(&token))
        .bind(now)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::UserNotFound(id.to_string()))?;

        Ok((user, token))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, login, display_name, email, role, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Find a user by login name
    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, login, display_name, email, role, created_at
            FROM users
            WHERE login = ?
            "#,
        )
        .bind(login)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Find the user a raw login token belongs to
    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, login, display_name, email, role, created_at
            FROM users
            WHERE token_hash = ?
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(self.db.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Replace a user's login token, returning the new raw token
    pub async fn rotate_token(&self, id: i64) -> Result<String> {
        let token = generate_token();

        let result = sqlx::query("UPDATE users SET token_hash = ? WHERE id = ?")
            .bind(hash_token(&token))
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(id.to_string()));
        }

        Ok(token)
    }
}
