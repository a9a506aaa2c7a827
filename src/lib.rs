//! Cachelet - An in-memory key/value cache server
//!
//! Stores JSON-shaped values under string keys with per-key TTL expiration,
//! dual capacity bounds (key count and approximate memory), and pluggable
//! eviction policies (LRU, LFU, FIFO), exposed over a small HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::Sweeper;
