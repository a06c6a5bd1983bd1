use async_trait::async_trait;
use shared::models::Role;

use super::PgStore;
use crate::db::{NewUser, RepoError, RepoResult, UserRecord, UserRepository};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    role: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_db(&row.role)
            .ok_or_else(|| RepoError::Database(format!("unknown role '{}' for user {}", row.role, row.id)))?;
        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            role,
        })
    }
}

fn into_record(row: Option<UserRow>) -> RepoResult<Option<UserRecord>> {
    row.map(UserRecord::try_from).transpose()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, data: NewUser) -> RepoResult<UserRecord> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username, email, password, role)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, email, password, role",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_digest)
        .bind(data.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<UserRecord>> {
        let row = sqlx::query_as(
            "SELECT id, username, email, password, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        into_record(row)
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let row = sqlx::query_as(
            "SELECT id, username, email, password, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        into_record(row)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let row = sqlx::query_as(
            "SELECT id, username, email, password, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        into_record(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
