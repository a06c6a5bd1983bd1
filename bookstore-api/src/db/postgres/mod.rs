//! PostgreSQL store (sqlx)

mod authors;
mod books;
mod orders;
mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{PgConnection, Postgres, Transaction};

use super::RepoError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQLSTATE codes the store maps onto repository errors
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// PostgreSQL-backed implementation of every repository trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    lock_timeout_ms: u64,
}

impl PgStore {
    /// Connect, then apply pending migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        lock_timeout_ms: u64,
    ) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::from_pool(pool, lock_timeout_ms))
    }

    pub fn from_pool(pool: PgPool, lock_timeout_ms: u64) -> Self {
        Self {
            pool,
            lock_timeout_ms,
        }
    }

    /// Begin a transaction whose row-lock waits are bounded
    async fn begin_locking(&self) -> Result<Transaction<'static, Postgres>, RepoError> {
        let mut tx = self.pool.begin().await?;
        set_lock_timeout(&mut tx, self.lock_timeout_ms).await?;
        Ok(tx)
    }
}

/// `SET LOCAL` is scoped to the enclosing transaction
async fn set_lock_timeout(conn: &mut PgConnection, timeout_ms: u64) -> Result<(), RepoError> {
    // SET does not accept bind parameters; the value is a plain integer
    sqlx::query(&format!("SET LOCAL lock_timeout = {timeout_ms}"))
        .execute(conn)
        .await?;
    Ok(())
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return RepoError::Duplicate(field_from_constraint(db.constraint()));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return RepoError::ForeignKey(
                        db.constraint().unwrap_or("foreign key").to_string(),
                    );
                }
                Some(LOCK_NOT_AVAILABLE) => return RepoError::LockTimeout,
                _ => {}
            }
        }
        if matches!(e, sqlx::Error::RowNotFound) {
            return RepoError::NotFound("row".to_string());
        }
        RepoError::Database(e.to_string())
    }
}

/// Unique constraints are named `<table>_<column>_key`
fn field_from_constraint(constraint: Option<&str>) -> String {
    match constraint {
        Some(name) => name
            .strip_suffix("_key")
            .and_then(|rest| rest.split_once('_'))
            .map(|(_, field)| field.to_string())
            .unwrap_or_else(|| name.to_string()),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_constraint() {
        assert_eq!(field_from_constraint(Some("users_username_key")), "username");
        assert_eq!(field_from_constraint(Some("users_email_key")), "email");
        assert_eq!(field_from_constraint(Some("authors_name_key")), "name");
        assert_eq!(field_from_constraint(Some("weird")), "weird");
        assert_eq!(field_from_constraint(None), "unknown");
    }
}
