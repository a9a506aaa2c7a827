//! Configuration Module
//!
//! Handles loading and managing server configuration from environment
//! variables. Unparseable values silently fall back to their defaults.

use std::env;

use crate::cache::PolicyKind;

/// Bytes per megabyte, for the memory bound conversion.
pub const BYTES_PER_MB: usize = 1_048_576;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. The cache bounds are immutable once the store is constructed.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub port: u16,
    /// Deployment environment tag (development/production)
    pub environment: String,
    /// Replacement policy used for capacity evictions
    pub eviction_policy: PolicyKind,
    /// Memory bound in megabytes
    pub max_memory_mb: usize,
    /// Key-count bound
    pub max_keys: usize,
    /// Background sweeper tick in milliseconds
    pub cleanup_interval_ms: u64,
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Whether to gzip responses
    pub enable_compression: bool,
    /// Per-IP request quota per minute, 0 disables limiting
    pub rate_limit_per_minute: u32,
    /// Allowed CORS origins; a single "*" allows any origin
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `NODE_ENV` - environment tag (default: development)
    /// - `EVICTION_POLICY` - LRU, LFU, or FIFO (default: LRU)
    /// - `MAX_MEMORY_MB` - memory bound in MB (default: 512)
    /// - `MAX_KEYS` - key-count bound (default: 100000)
    /// - `CLEANUP_INTERVAL_MS` - sweeper tick (default: 60000)
    /// - `LOG_LEVEL` - debug/info/warn/error (default: info)
    /// - `ENABLE_COMPRESSION` - gzip responses (default: true)
    /// - `RATE_LIMIT_PER_MINUTE` - per-IP quota (default: 100)
    /// - `CORS_ORIGINS` - comma-separated origins or `*`
    ///   (default: http://localhost:5173)
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            environment: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),
            eviction_policy: env::var("EVICTION_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(PolicyKind::Lru),
            max_memory_mb: env::var("MAX_MEMORY_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(512),
            max_keys: env::var("MAX_KEYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100_000),
            cleanup_interval_ms: env::var("CLEANUP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            enable_compression: env::var("ENABLE_COMPRESSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            cors_origins: env::var("CORS_ORIGINS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["http://localhost:5173".to_string()]),
        }
    }

    /// Memory bound in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_memory_mb.saturating_mul(BYTES_PER_MB)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: "development".to_string(),
            eviction_policy: PolicyKind::Lru,
            max_memory_mb: 512,
            max_keys: 100_000,
            cleanup_interval_ms: 60_000,
            log_level: "info".to_string(),
            enable_compression: true,
            rate_limit_per_minute: 100,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// True when the process runs with `NODE_ENV=production`.
pub fn is_production() -> bool {
    env::var("NODE_ENV").map(|v| v == "production").unwrap_or(false)
}
