//! Input validation
//!
//! Explicit checks run at the request boundary, before any domain logic.
//! Field problems are collected and reported together as
//! `ValidationFailed` with `details = {field: message}`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AuthorCreate, BookCreate, BookUpdate, UserCreate};

// ── Limits ──────────────────────────────────────────────────────────

/// Author names and book titles
pub const MAX_NAME_LEN: usize = 255;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MIN_PASSWORD_LEN: usize = 6;
/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MAX_PAGE_LIMIT: i64 = 100;

// ── Collector ───────────────────────────────────────────────────────

/// Accumulates per-field messages
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // First problem per field wins
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required text: non-blank and within `min..=max` characters
    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if value.trim().is_empty() {
            self.add(field, format!("{field} must not be empty"));
        } else if len < min {
            self.add(field, format!("{field} must be at least {min} characters"));
        } else if len > max {
            self.add(field, format!("{field} is too long ({len} chars, max {max})"));
        }
    }

    pub fn non_negative(&mut self, field: &str, value: i64) {
        if value < 0 {
            self.add(field, format!("{field} must be greater than or equal to 0"));
        }
    }

    /// `Ok(())` when nothing was collected
    pub fn finish(self) -> AppResult<()> {
        if self.0.is_empty() {
            return Ok(());
        }
        let summary = self
            .0
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        Err(self
            .0
            .into_iter()
            .fold(AppError::validation(summary), |err, (field, msg)| {
                err.with_detail(field, msg)
            }))
    }
}

// ── Entity checks ───────────────────────────────────────────────────

pub fn validate_author(data: &AuthorCreate) -> AppResult<()> {
    validate_author_at(data, Utc::now().date_naive())
}

/// Author checks against an explicit "today"
pub fn validate_author_at(data: &AuthorCreate, today: NaiveDate) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    errors.text("name", &data.name, 1, MAX_NAME_LEN);
    if data.birth_date > today {
        errors.add("birth_date", "birth_date cannot be in the future");
    }
    errors.finish()
}

pub fn validate_book_create(data: &BookCreate) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    errors.text("title", &data.title, 1, MAX_NAME_LEN);
    errors.non_negative("price", data.price);
    errors.non_negative("stock_quantity", data.stock_quantity.into());
    errors.finish()
}

/// Present fields obey the create rules; absent fields are not checked
pub fn validate_book_update(data: &BookUpdate) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if let Some(title) = &data.title {
        errors.text("title", title, 1, MAX_NAME_LEN);
    }
    if let Some(price) = data.price {
        errors.non_negative("price", price);
    }
    if let Some(stock) = data.stock_quantity {
        errors.non_negative("stock_quantity", stock.into());
    }
    errors.finish()
}

pub fn validate_registration(data: &UserCreate) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    errors.text("username", &data.username, MIN_USERNAME_LEN, MAX_USERNAME_LEN);
    if !is_valid_email(&data.email) {
        errors.add("email", "value is not a valid email address");
    }
    let password_len = data.password.chars().count();
    if password_len < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    } else if password_len > MAX_PASSWORD_LEN {
        errors.add(
            "password",
            format!("password is too long (max {MAX_PASSWORD_LEN})"),
        );
    }
    errors.finish()
}

pub fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::new(ErrorCode::InvalidQuantity)
            .with_detail("quantity", "quantity must be greater than 0"));
    }
    Ok(())
}

/// Pagination window: `limit` in 1..=100, `offset` >= 0
pub fn validate_page(limit: i64, offset: i64) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        errors.add("limit", format!("limit must be between 1 and {MAX_PAGE_LIMIT}"));
    }
    if offset < 0 {
        errors.add("offset", "offset must be greater than or equal to 0");
    }
    errors.finish()
}

/// Syntactic check: one `@`, non-empty local part, dotted domain, no spaces
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels
            .iter()
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}
