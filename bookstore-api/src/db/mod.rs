//! Database access layer
//!
//! One repository trait per entity, each exposing only the access patterns the
//! service needs. Two backends implement them:
//! - [`postgres::PgStore`] (production, sqlx)
//! - [`memory::MemoryStore`] (in-process, used by `memory://` and the tests)
//!
//! Relationship fetches are explicit: a repository method either returns the
//! bare row or a declared composite (`BookDetail`, `AuthorWithBooks`).

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{
    Author, AuthorCreate, AuthorWithBooks, Book, BookCreate, BookDetail, BookFilter, BookUpdate,
    Order, Role,
};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violated; carries the offending field name
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Foreign key violated (missing parent or restricted delete)
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// Row lock could not be acquired within the configured wait
    #[error("Lock wait timeout")]
    LockTimeout,

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Offset/limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

/// Stored user, including the password digest
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl From<UserRecord> for shared::models::User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            role: record.role,
        }
    }
}

/// Insert payload for a user (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub role: Role,
}

/// Insert payload for an order
#[derive(Debug, Clone, Copy)]
pub struct NewOrder {
    pub user_id: i64,
    pub book_id: i64,
    pub quantity: i32,
    pub total_price: i64,
}

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn create(&self, data: &AuthorCreate) -> RepoResult<Author>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Author>>;
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Author>>;
    async fn list(&self, page: Page) -> RepoResult<Vec<Author>>;
    /// Author plus all of their books, in id order
    async fn find_with_books(&self, id: i64) -> RepoResult<Option<AuthorWithBooks>>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Fails with `ForeignKey` when the author does not exist
    async fn create(&self, data: &BookCreate) -> RepoResult<BookDetail>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<BookDetail>>;
    /// Returns the page of items and the total matching count
    async fn list(&self, filter: BookFilter, page: Page) -> RepoResult<(Vec<BookDetail>, i64)>;
    /// Partial update under the book's row lock; `None` when absent
    async fn update(&self, id: i64, data: &BookUpdate) -> RepoResult<Option<BookDetail>>;
    /// `Ok(false)` when absent, `ForeignKey` when orders still reference it
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Duplicate("username" | "email")` on a uniqueness clash
    async fn create(&self, data: NewUser) -> RepoResult<UserRecord>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<UserRecord>>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>>;
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Open a transaction for the order-placement flow
    async fn begin(&self) -> RepoResult<Box<dyn OrderTransaction>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>>;
    /// Orders placed by `user_id`, newest first
    async fn list_by_user(&self, user_id: i64, page: Page) -> RepoResult<Vec<Order>>;
}

/// Scoped transaction handle.
///
/// Dropping the handle without calling [`OrderTransaction::commit`] rolls back
/// every staged write and releases any row lock held.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Read a book holding an exclusive row lock until the transaction ends
    async fn get_book_for_update(&mut self, book_id: i64) -> RepoResult<Option<Book>>;
    async fn set_stock(&mut self, book_id: i64, stock_quantity: i32) -> RepoResult<()>;
    async fn insert_order(&mut self, order: NewOrder) -> RepoResult<Order>;
    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

/// All repositories behind one handle
#[derive(Clone)]
pub struct Repositories {
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
    pub users: Arc<dyn UserRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    pub fn from_store<S>(store: S) -> Self
    where
        S: AuthorRepository + BookRepository + UserRepository + OrderRepository + Clone + 'static,
    {
        Self {
            authors: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            orders: Arc::new(store),
        }
    }
}
