//! Service info and health check endpoints

use axum::Json;

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "bookstore-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": ["/auth/register", "/auth/login"],
            "authors": "/authors",
            "books": "/books",
            "orders": "/orders",
            "health": "/health",
        },
    }))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
