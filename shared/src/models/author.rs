//! Author Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::book::Book;

/// Author entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: NaiveDate,
}

/// Create author payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorCreate {
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    pub birth_date: NaiveDate,
}

/// Author detail with their books (books carry no nested author)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}
