use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::models::{Author, Book, BookCreate, BookDetail, BookFilter, BookUpdate};

use super::PgStore;
use crate::db::{BookRepository, Page, RepoResult};

const DETAIL_SELECT: &str = "SELECT b.id, b.title, b.description, b.price, b.stock_quantity,
        b.author_id, b.created_at,
        a.name AS author_name, a.bio AS author_bio, a.birth_date AS author_birth_date
     FROM books b
     JOIN authors a ON a.id = b.author_id";

/// Book joined with its author
#[derive(sqlx::FromRow)]
struct BookDetailRow {
    id: i64,
    title: String,
    description: String,
    price: i64,
    stock_quantity: i32,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_name: String,
    author_bio: Option<String>,
    author_birth_date: NaiveDate,
}

impl From<BookDetailRow> for BookDetail {
    fn from(row: BookDetailRow) -> Self {
        Self {
            author: Author {
                id: row.author_id,
                name: row.author_name,
                bio: row.author_bio,
                birth_date: row.author_birth_date,
            },
            book: Book {
                id: row.id,
                title: row.title,
                description: row.description,
                price: row.price,
                stock_quantity: row.stock_quantity,
                author_id: row.author_id,
                created_at: row.created_at,
            },
        }
    }
}

impl PgStore {
    async fn fetch_detail(&self, id: i64) -> RepoResult<Option<BookDetail>> {
        let row: Option<BookDetailRow> = sqlx::query_as(&format!("{DETAIL_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BookDetail::from))
    }
}

#[async_trait]
impl BookRepository for PgStore {
    async fn create(&self, data: &BookCreate) -> RepoResult<BookDetail> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO books (title, description, price, stock_quantity, author_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.price)
        .bind(data.stock_quantity)
        .bind(data.author_id)
        .fetch_one(&self.pool)
        .await?;

        self.fetch_detail(id)
            .await?
            .ok_or_else(|| crate::db::RepoError::NotFound(format!("book {id}")))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<BookDetail>> {
        self.fetch_detail(id).await
    }

    async fn list(&self, filter: BookFilter, page: Page) -> RepoResult<(Vec<BookDetail>, i64)> {
        let rows: Vec<BookDetailRow> = sqlx::query_as(&format!(
            "{DETAIL_SELECT}
             WHERE ($1::BIGINT IS NULL OR b.author_id = $1)
             ORDER BY b.id
             LIMIT $2 OFFSET $3"
        ))
        .bind(filter.author_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM books WHERE ($1::BIGINT IS NULL OR author_id = $1)")
                .bind(filter.author_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((rows.into_iter().map(BookDetail::from).collect(), total))
    }

    async fn update(&self, id: i64, data: &BookUpdate) -> RepoResult<Option<BookDetail>> {
        let mut tx = self.begin_locking().await?;

        let current: Option<Book> = sqlx::query_as(
            "SELECT id, title, description, price, stock_quantity, author_id, created_at
             FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut book) = current else {
            return Ok(None);
        };
        data.apply_to(&mut book);

        sqlx::query(
            "UPDATE books SET title = $1, description = $2, price = $3, stock_quantity = $4
             WHERE id = $5",
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.price)
        .bind(book.stock_quantity)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.fetch_detail(id).await
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tx = self.begin_locking().await?;

        let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(false);
        }

        // Restricted by orders.book_id; surfaces as a foreign key violation
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
