//! Shared helpers for the HTTP integration tests
//!
//! Every test gets its own router over a fresh in-memory store and drives it
//! in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use bookstore_api::auth::password::hash_password;
use bookstore_api::db::memory::MemoryStore;
use bookstore_api::db::{NewUser, Repositories};
use bookstore_api::{AppState, Config, api};
use http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use shared::models::Role;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Response status, headers and parsed JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::for_memory())
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new(Duration::from_millis(config.order_lock_timeout_ms));
        let state = AppState::with_repositories(config, Repositories::from_store(store));
        let router = api::create_router(state.clone());
        Self { router, state }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::DELETE, uri, token, None).await
    }

    /// Register through the API and log in; returns (user id, token)
    pub async fn register_user(&self, username: &str) -> (i64, String) {
        let res = self
            .post(
                "/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "secret123",
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        let id = res.body["id"].as_i64().unwrap();
        (id, self.login(username, "secret123").await)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .post(
                "/auth/login",
                None,
                json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
        res.body["access_token"].as_str().unwrap().to_string()
    }

    /// Admins are provisioned directly in the store, then log in normally
    pub async fn seed_admin(&self, username: &str) -> String {
        self.state
            .repos
            .users
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@admin.example.com"),
                password_digest: hash_password("admin-pass").unwrap(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        self.login(username, "admin-pass").await
    }

    pub async fn create_author(&self, admin: &str, name: &str) -> i64 {
        let res = self
            .post(
                "/authors",
                Some(admin),
                json!({ "name": name, "bio": null, "birth_date": "1950-01-01" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["id"].as_i64().unwrap()
    }

    pub async fn create_book(&self, admin: &str, author_id: i64, price: i64, stock: i32) -> i64 {
        let res = self
            .post(
                "/books",
                Some(admin),
                json!({
                    "title": format!("Book by {author_id} at {price}"),
                    "description": "A test book",
                    "price": price,
                    "stock_quantity": stock,
                    "author_id": author_id,
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["id"].as_i64().unwrap()
    }

    pub async fn stock_of(&self, book_id: i64) -> i64 {
        let res = self.get(&format!("/books/{book_id}"), None).await;
        assert_eq!(res.status, StatusCode::OK);
        res.body["stock_quantity"].as_i64().unwrap()
    }
}
