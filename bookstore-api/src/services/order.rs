//! Order placement
//!
//! The whole check-decrement-insert sequence runs inside one transaction that
//! holds the book's row lock from the first read until commit. Any early
//! return drops the transaction handle, which rolls it back.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Order;

use crate::db::{NewOrder, OrderRepository};

/// Place an order for `quantity` copies of `book_id` on behalf of `user_id`.
///
/// `quantity` must already be validated as positive.
pub async fn place_order(
    orders: &dyn OrderRepository,
    user_id: i64,
    book_id: i64,
    quantity: i32,
) -> AppResult<Order> {
    let mut tx = orders.begin().await?;

    let Some(book) = tx.get_book_for_update(book_id).await? else {
        tracing::debug!(user_id, book_id, "Order rejected: book not found");
        return Err(AppError::new(ErrorCode::BookNotFound).with_detail("book_id", book_id));
    };

    if book.stock_quantity < quantity {
        tracing::info!(
            user_id,
            book_id,
            quantity,
            available = book.stock_quantity,
            "Order rejected: insufficient stock"
        );
        return Err(insufficient_stock(book.stock_quantity, quantity));
    }

    // Price read under the lock, so it cannot change before the insert
    let total_price = book
        .price
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ValueOutOfRange, "Order total is out of range")
                .with_detail("quantity", quantity)
        })?;

    tx.set_stock(book_id, book.stock_quantity - quantity).await?;
    let order = tx
        .insert_order(NewOrder {
            user_id,
            book_id,
            quantity,
            total_price,
        })
        .await?;
    tx.commit().await?;

    tracing::info!(
        order_id = order.id,
        user_id,
        book_id,
        quantity,
        total_price,
        "Order placed"
    );
    Ok(order)
}

fn insufficient_stock(available: i32, requested: i32) -> AppError {
    AppError::with_message(
        ErrorCode::InsufficientStock,
        format!("Not enough stock. Available: {available}, requested: {requested}"),
    )
    .with_detail("available", available)
    .with_detail("requested", requested)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use shared::models::{AuthorCreate, BookCreate, BookUpdate, Role};

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::{AuthorRepository, BookRepository, NewUser, UserRepository};

    async fn store_with_book(stock: i32, price: i64) -> (MemoryStore, i64, i64) {
        let store = MemoryStore::new(Duration::from_secs(5));
        let author = AuthorRepository::create(
            &store,
            &AuthorCreate {
                name: "Italo Calvino".to_string(),
                bio: None,
                birth_date: NaiveDate::from_ymd_opt(1923, 10, 15).unwrap(),
            },
        )
        .await
        .unwrap();
        let book = BookRepository::create(
            &store,
            &BookCreate {
                title: "Invisible Cities".to_string(),
                description: "Marco Polo".to_string(),
                price,
                stock_quantity: stock,
                author_id: author.id,
            },
        )
        .await
        .unwrap();
        let user = UserRepository::create(
            &store,
            NewUser {
                username: "kublai".to_string(),
                email: "kublai@khan.example".to_string(),
                password_digest: "digest".to_string(),
                role: Role::User,
            },
        )
        .await
        .unwrap();
        (store, book.book.id, user.id)
    }

    async fn stock(store: &MemoryStore, book_id: i64) -> i32 {
        BookRepository::find_by_id(store, book_id)
            .await
            .unwrap()
            .unwrap()
            .book
            .stock_quantity
    }

    #[tokio::test]
    async fn test_order_decrements_stock_and_freezes_price() {
        let (store, book_id, user_id) = store_with_book(10, 1250).await;

        let order = place_order(&store, user_id, book_id, 4).await.unwrap();
        assert_eq!(order.total_price, 5000);
        assert_eq!(order.quantity, 4);
        assert_eq!(stock(&store, book_id).await, 6);

        BookRepository::update(
            &store,
            book_id,
            &BookUpdate {
                price: Some(9999),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let stored = OrderRepository::find_by_id(&store, order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_price, 5000);
    }

    #[tokio::test]
    async fn test_insufficient_stock_reports_both_quantities() {
        let (store, book_id, user_id) = store_with_book(3, 100).await;

        let err = place_order(&store, user_id, book_id, 5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Not enough stock. Available: 3, requested: 5");
        let details = err.details.unwrap();
        assert_eq!(details["available"], 3);
        assert_eq!(details["requested"], 5);
        assert_eq!(stock(&store, book_id).await, 3);
    }

    #[tokio::test]
    async fn test_exact_stock_can_be_bought() {
        let (store, book_id, user_id) = store_with_book(3, 100).await;
        place_order(&store, user_id, book_id, 3).await.unwrap();
        assert_eq!(stock(&store, book_id).await, 0);
    }

    #[tokio::test]
    async fn test_missing_book() {
        let (store, _, user_id) = store_with_book(3, 100).await;
        let err = place_order(&store, user_id, 9999, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BookNotFound);
    }

    #[tokio::test]
    async fn test_total_overflow_rejected_without_side_effects() {
        let (store, book_id, user_id) = store_with_book(i32::MAX, i64::MAX / 2).await;
        let err = place_order(&store, user_id, book_id, 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(stock(&store, book_id).await, i32::MAX);
    }
}
