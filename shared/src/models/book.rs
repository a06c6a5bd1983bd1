//! Book Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::author::Author;

/// Book entity
///
/// `price` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub stock_quantity: i32,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Book with its author embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub author: Author,
}

/// Create book payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookCreate {
    pub title: String,
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub stock_quantity: i32,
    pub author_id: i64,
}

/// Partial book update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
}

impl BookUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock_quantity.is_none()
    }

    /// Apply the present fields onto `book`
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(description) = &self.description {
            book.description = description.clone();
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(stock_quantity) = self.stock_quantity {
            book.stock_quantity = stock_quantity;
        }
    }
}

/// Book list filter
#[derive(Debug, Clone, Copy, Default)]
pub struct BookFilter {
    pub author_id: Option<i64>,
}

/// Paginated book listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPage {
    pub items: Vec<BookDetail>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book {
            id: 1,
            title: "Dune".to_string(),
            description: "Spice".to_string(),
            price: 1999,
            stock_quantity: 10,
            author_id: 7,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let update: BookUpdate = serde_json::from_str(r#"{"price": 2999}"#).unwrap();
        let mut book = sample();
        update.apply_to(&mut book);

        assert_eq!(book.price, 2999);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.description, "Spice");
        assert_eq!(book.stock_quantity, 10);
    }

    #[test]
    fn test_update_null_is_absent() {
        let update: BookUpdate = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_detail_flattens_book() {
        let detail = BookDetail {
            book: sample(),
            author: Author {
                id: 7,
                name: "Frank Herbert".to_string(),
                bio: None,
                birth_date: chrono::NaiveDate::from_ymd_opt(1920, 10, 8).unwrap(),
            },
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Dune");
        assert_eq!(json["author"]["name"], "Frank Herbert");
        assert_eq!(json["author"]["birth_date"], "1920-10-08");
    }
}
