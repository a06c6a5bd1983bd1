use async_trait::async_trait;
use shared::models::{Book, Order};
use sqlx::{Postgres, Transaction};

use super::PgStore;
use crate::db::{NewOrder, OrderRepository, OrderTransaction, Page, RepoResult};

/// Order-placement transaction over a pooled connection.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn get_book_for_update(&mut self, book_id: i64) -> RepoResult<Option<Book>> {
        let book = sqlx::query_as(
            "SELECT id, title, description, price, stock_quantity, author_id, created_at
             FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(book)
    }

    async fn set_stock(&mut self, book_id: i64, stock_quantity: i32) -> RepoResult<()> {
        sqlx::query("UPDATE books SET stock_quantity = $1 WHERE id = $2")
            .bind(stock_quantity)
            .bind(book_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> RepoResult<Order> {
        let order = sqlx::query_as(
            "INSERT INTO orders (user_id, book_id, quantity, total_price)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, book_id, quantity, total_price, created_at",
        )
        .bind(order.user_id)
        .bind(order.book_id)
        .bind(order.quantity)
        .bind(order.total_price)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(order)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn begin(&self) -> RepoResult<Box<dyn OrderTransaction>> {
        let tx = self.begin_locking().await?;
        Ok(Box::new(PgOrderTransaction { tx }))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        let order = sqlx::query_as(
            "SELECT id, user_id, book_id, quantity, total_price, created_at
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn list_by_user(&self, user_id: i64, page: Page) -> RepoResult<Vec<Order>> {
        let orders = sqlx::query_as(
            "SELECT id, user_id, book_id, quantity, total_price, created_at
             FROM orders WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}
