//! In-process store
//!
//! Tables live behind one `parking_lot::Mutex` that is never held across an
//! await. Row locks for books are per-id `tokio::sync::Mutex`es, acquired with
//! a bounded wait, so order placement serializes per book exactly like
//! `SELECT ... FOR UPDATE` does in PostgreSQL.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared::models::{
    Author, AuthorCreate, AuthorWithBooks, Book, BookCreate, BookDetail, BookFilter, BookUpdate,
    Order,
};
use tokio::sync::OwnedMutexGuard;

use super::{
    AuthorRepository, BookRepository, NewOrder, NewUser, OrderRepository, OrderTransaction, Page,
    RepoError, RepoResult, UserRecord, UserRepository,
};

#[derive(Default)]
struct Tables {
    authors: BTreeMap<i64, Author>,
    books: BTreeMap<i64, Book>,
    users: BTreeMap<i64, UserRecord>,
    orders: BTreeMap<i64, Order>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn detail(&self, book: &Book) -> RepoResult<BookDetail> {
        let author = self.authors.get(&book.author_id).cloned().ok_or_else(|| {
            RepoError::Database(format!("book {} references missing author", book.id))
        })?;
        Ok(BookDetail {
            book: book.clone(),
            author,
        })
    }
}

/// In-memory implementation of every repository trait
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    row_locks: Arc<DashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
    lock_timeout: Duration,
}

impl MemoryStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            row_locks: Arc::new(DashMap::new()),
            lock_timeout,
        }
    }

    /// Acquire the exclusive row lock for a book, waiting at most `lock_timeout`.
    ///
    /// `None` when the book does not exist. Lock entries exist only for stored
    /// books: both the check here and the removal in `delete` happen under the
    /// table mutex.
    async fn lock_book(&self, book_id: i64) -> RepoResult<Option<OwnedMutexGuard<()>>> {
        let lock = {
            let tables = self.tables.lock();
            if !tables.books.contains_key(&book_id) {
                return Ok(None);
            }
            self.row_locks.entry(book_id).or_default().clone()
        };
        tokio::time::timeout(self.lock_timeout, lock.lock_owned())
            .await
            .map(Some)
            .map_err(|_| RepoError::LockTimeout)
    }
}

#[async_trait]
impl AuthorRepository for MemoryStore {
    async fn create(&self, data: &AuthorCreate) -> RepoResult<Author> {
        let mut tables = self.tables.lock();
        if tables.authors.values().any(|a| a.name == data.name) {
            return Err(RepoError::Duplicate("name".to_string()));
        }
        let author = Author {
            id: tables.next_id(),
            name: data.name.clone(),
            bio: data.bio.clone(),
            birth_date: data.birth_date,
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Author>> {
        Ok(self.tables.lock().authors.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        let tables = self.tables.lock();
        Ok(tables.authors.values().find(|a| a.name == name).cloned())
    }

    async fn list(&self, page: Page) -> RepoResult<Vec<Author>> {
        let tables = self.tables.lock();
        Ok(tables
            .authors
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_with_books(&self, id: i64) -> RepoResult<Option<AuthorWithBooks>> {
        let tables = self.tables.lock();
        let Some(author) = tables.authors.get(&id).cloned() else {
            return Ok(None);
        };
        let books = tables
            .books
            .values()
            .filter(|b| b.author_id == id)
            .cloned()
            .collect();
        Ok(Some(AuthorWithBooks { author, books }))
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn create(&self, data: &BookCreate) -> RepoResult<BookDetail> {
        let mut tables = self.tables.lock();
        if !tables.authors.contains_key(&data.author_id) {
            return Err(RepoError::ForeignKey("books_author_id_fkey".to_string()));
        }
        let book = Book {
            id: tables.next_id(),
            title: data.title.clone(),
            description: data.description.clone(),
            price: data.price,
            stock_quantity: data.stock_quantity,
            author_id: data.author_id,
            created_at: Utc::now(),
        };
        tables.books.insert(book.id, book.clone());
        tables.detail(&book)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<BookDetail>> {
        let tables = self.tables.lock();
        tables.books.get(&id).map(|b| tables.detail(b)).transpose()
    }

    async fn list(&self, filter: BookFilter, page: Page) -> RepoResult<(Vec<BookDetail>, i64)> {
        let tables = self.tables.lock();
        let matching: Vec<&Book> = tables
            .books
            .values()
            .filter(|b| filter.author_id.is_none_or(|author_id| b.author_id == author_id))
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(|b| tables.detail(b))
            .collect::<RepoResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn update(&self, id: i64, data: &BookUpdate) -> RepoResult<Option<BookDetail>> {
        let Some(_row) = self.lock_book(id).await? else {
            return Ok(None);
        };
        let mut tables = self.tables.lock();
        let Some(book) = tables.books.get_mut(&id) else {
            return Ok(None);
        };
        let mut updated = book.clone();
        data.apply_to(&mut updated);
        if updated.price < 0 || updated.stock_quantity < 0 {
            return Err(RepoError::Database("books check constraint violated".to_string()));
        }
        *book = updated.clone();
        tables.detail(&updated).map(Some)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let Some(_row) = self.lock_book(id).await? else {
            return Ok(false);
        };
        let mut tables = self.tables.lock();
        if !tables.books.contains_key(&id) {
            return Ok(false);
        }
        if tables.orders.values().any(|o| o.book_id == id) {
            return Err(RepoError::ForeignKey("orders_book_id_fkey".to_string()));
        }
        tables.books.remove(&id);
        // Waiters holding a clone of the old lock will find the book gone
        self.row_locks.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, data: NewUser) -> RepoResult<UserRecord> {
        let mut tables = self.tables.lock();
        if tables.users.values().any(|u| u.username == data.username) {
            return Err(RepoError::Duplicate("username".to_string()));
        }
        if tables.users.values().any(|u| u.email == data.email) {
            return Err(RepoError::Duplicate("email".to_string()));
        }
        let user = UserRecord {
            id: tables.next_id(),
            username: data.username,
            email: data.email,
            password: data.password_digest,
            role: data.role,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<UserRecord>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let tables = self.tables.lock();
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let tables = self.tables.lock();
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        if tables.orders.values().any(|o| o.user_id == id) {
            return Err(RepoError::ForeignKey("orders_user_id_fkey".to_string()));
        }
        Ok(tables.users.remove(&id).is_some())
    }
}

/// Staged order-placement writes.
///
/// Nothing touches the tables until `commit`; dropping the handle discards the
/// staged writes and releases the row locks.
struct MemoryOrderTransaction {
    store: MemoryStore,
    locks: HashMap<i64, OwnedMutexGuard<()>>,
    stock: HashMap<i64, i32>,
    orders: Vec<Order>,
}

impl MemoryOrderTransaction {
    fn require_lock(&self, book_id: i64) -> RepoResult<()> {
        if self.locks.contains_key(&book_id) {
            Ok(())
        } else {
            Err(RepoError::Database(format!("book {book_id} is not locked by this transaction")))
        }
    }
}

#[async_trait]
impl OrderTransaction for MemoryOrderTransaction {
    async fn get_book_for_update(&mut self, book_id: i64) -> RepoResult<Option<Book>> {
        if !self.locks.contains_key(&book_id) {
            let Some(guard) = self.store.lock_book(book_id).await? else {
                return Ok(None);
            };
            self.locks.insert(book_id, guard);
        }
        let tables = self.store.tables.lock();
        Ok(tables.books.get(&book_id).cloned().map(|mut book| {
            if let Some(stock) = self.stock.get(&book_id) {
                book.stock_quantity = *stock;
            }
            book
        }))
    }

    async fn set_stock(&mut self, book_id: i64, stock_quantity: i32) -> RepoResult<()> {
        self.require_lock(book_id)?;
        if stock_quantity < 0 {
            return Err(RepoError::Database("books_stock_quantity_check violated".to_string()));
        }
        self.stock.insert(book_id, stock_quantity);
        Ok(())
    }

    async fn insert_order(&mut self, order: NewOrder) -> RepoResult<Order> {
        self.require_lock(order.book_id)?;
        if order.quantity <= 0 {
            return Err(RepoError::Database("orders_quantity_check violated".to_string()));
        }
        let mut tables = self.store.tables.lock();
        if !tables.users.contains_key(&order.user_id) {
            return Err(RepoError::ForeignKey("orders_user_id_fkey".to_string()));
        }
        if !tables.books.contains_key(&order.book_id) {
            return Err(RepoError::ForeignKey("orders_book_id_fkey".to_string()));
        }
        let order = Order {
            id: tables.next_id(),
            user_id: order.user_id,
            book_id: order.book_id,
            quantity: order.quantity,
            total_price: order.total_price,
            created_at: Utc::now(),
        };
        self.orders.push(order.clone());
        Ok(order)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let this = *self;
        {
            let mut tables = this.store.tables.lock();
            for (book_id, stock) in &this.stock {
                let book = tables
                    .books
                    .get_mut(book_id)
                    .ok_or_else(|| RepoError::NotFound(format!("book {book_id}")))?;
                book.stock_quantity = *stock;
            }
            for order in this.orders {
                tables.orders.insert(order.id, order);
            }
        }
        drop(this.locks);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn begin(&self) -> RepoResult<Box<dyn OrderTransaction>> {
        Ok(Box::new(MemoryOrderTransaction {
            store: self.clone(),
            locks: HashMap::new(),
            stock: HashMap::new(),
            orders: Vec::new(),
        }))
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        Ok(self.tables.lock().orders.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: i64, page: Page) -> RepoResult<Vec<Order>> {
        let tables = self.tables.lock();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }
}
