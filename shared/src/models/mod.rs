//! Data models
//!
//! Entities and request/response payloads shared by the server and its clients.

pub mod author;
pub mod book;
pub mod order;
pub mod user;

pub use author::{Author, AuthorCreate, AuthorWithBooks};
pub use book::{Book, BookCreate, BookDetail, BookFilter, BookPage, BookUpdate};
pub use order::{Order, OrderCreate};
pub use user::{LoginRequest, Role, TokenResponse, User, UserCreate};
