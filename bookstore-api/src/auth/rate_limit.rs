//! Per-IP rate limiting for login and registration

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use shared::error::{AppError, ErrorCode};
use tokio::time::Instant;

use crate::security_log;
use crate::state::AppState;

const WINDOW: Duration = Duration::from_secs(60);
const LOGIN_LIMIT: u32 = 5;
const REGISTER_LIMIT: u32 = 3;

struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window counters keyed by (route, client IP)
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<DashMap<(&'static str, String), Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request; `false` once the window's budget is spent
    pub fn check(&self, route: &'static str, ip: &str, max_requests: u32) -> bool {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry((route, ip.to_owned()))
            .or_insert_with(|| Window {
                count: 0,
                started: now,
            });

        if now.duration_since(entry.started) >= WINDOW {
            entry.count = 0;
            entry.started = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop windows idle for more than five minutes
    pub fn cleanup(&self) {
        let cutoff = Duration::from_secs(300);
        let now = Instant::now();
        self.windows
            .retain(|_, window| now.duration_since(window.started) < cutoff);
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Client IP: the peer address, or the first X-Forwarded-For entry when the
/// deployment sits behind a trusted proxy
fn client_ip(request: &Request, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(first) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return first.to_owned();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(
    state: &AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Response {
    if state.config.rate_limit_enabled {
        let ip = client_ip(&request, state.config.trust_proxy_headers);
        if !state.rate_limiter.check(route, &ip, max_requests) {
            security_log!("rate_limited", route = route, ip = ip.as_str());
            return AppError::new(ErrorCode::RateLimited).into_response();
        }
    }
    next.run(request).await
}

/// Login: 5 requests per minute per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    limit(&state, "login", LOGIN_LIMIT, request, next).await
}

/// Registration: 3 requests per minute per IP
pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    limit(&state, "register", REGISTER_LIMIT, request, next).await
}
