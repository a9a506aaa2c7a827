//! Rate Limiting Module
//!
//! Fixed-window per-IP request limiting applied in front of every route.
//! The window is 60 seconds; a limit of 0 disables the middleware entirely.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::handlers::AppState;
use crate::error::CacheError;

/// Width of the quota window.
const WINDOW: Duration = Duration::from_secs(60);

/// Stale-client cleanup threshold for the window table.
const PRUNE_ABOVE: usize = 10_000;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

// == Rate Limiter ==
/// Per-IP fixed-window counter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Requests allowed per window; 0 = unlimited
    limit: u32,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `limit` requests per minute per IP.
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a request from `ip`. Returns false when the quota for the
    /// current window is already spent.
    pub fn check(&self, ip: IpAddr) -> bool {
        if self.limit == 0 {
            return true;
        }
        let Ok(mut windows) = self.windows.lock() else {
            return true;
        };
        let now = Instant::now();

        if windows.len() > PRUNE_ABOVE {
            windows.retain(|_, w| now.duration_since(w.started) < WINDOW);
        }

        let window = windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }
        if window.count >= self.limit {
            return false;
        }
        window.count += 1;
        true
    }
}

// == Middleware ==
/// Axum middleware enforcing the per-IP quota.
///
/// Requests without peer-address information (e.g. in-process test calls)
/// bypass the limiter.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    if let Some(ip) = peer_ip {
        if !state.rate_limiter.check(ip) {
            return CacheError::RateLimited.into_response();
        }
    }

    next.run(request).await
}
