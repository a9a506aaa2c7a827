//! API Module
//!
//! HTTP handlers, middleware, and routing for the cache server REST API.

pub mod handlers;
pub mod rate_limit;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
