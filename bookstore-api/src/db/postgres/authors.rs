use async_trait::async_trait;
use shared::models::{Author, AuthorCreate, AuthorWithBooks, Book};

use super::PgStore;
use crate::db::{AuthorRepository, Page, RepoResult};

#[async_trait]
impl AuthorRepository for PgStore {
    async fn create(&self, data: &AuthorCreate) -> RepoResult<Author> {
        let author = sqlx::query_as(
            "INSERT INTO authors (name, bio, birth_date)
             VALUES ($1, $2, $3)
             RETURNING id, name, bio, birth_date",
        )
        .bind(&data.name)
        .bind(&data.bio)
        .bind(data.birth_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Author>> {
        let author = sqlx::query_as("SELECT id, name, bio, birth_date FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(author)
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        let author =
            sqlx::query_as("SELECT id, name, bio, birth_date FROM authors WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(author)
    }

    async fn list(&self, page: Page) -> RepoResult<Vec<Author>> {
        let authors = sqlx::query_as(
            "SELECT id, name, bio, birth_date FROM authors
             ORDER BY id
             LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn find_with_books(&self, id: i64) -> RepoResult<Option<AuthorWithBooks>> {
        let Some(author) = AuthorRepository::find_by_id(self, id).await? else {
            return Ok(None);
        };

        let books: Vec<Book> = sqlx::query_as(
            "SELECT id, title, description, price, stock_quantity, author_id, created_at
             FROM books WHERE author_id = $1
             ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(AuthorWithBooks { author, books }))
    }
}
