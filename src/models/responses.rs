//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies. Multi-word fields
//! are camelCase on the wire.

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Response body for GET /api/get/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Option<Value>,
    pub exists: bool,
}

impl GetResponse {
    /// Builds the hit or miss shape from an optional lookup result.
    pub fn new(key: impl Into<String>, value: Option<Value>) -> Self {
        let exists = value.is_some();
        Self {
            key: key.into(),
            value,
            exists,
        }
    }
}

/// Response body for POST /api/set
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub success: bool,
    pub key: String,
    pub ttl: Option<i64>,
}

/// Response body for DELETE /api/delete/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub key: String,
}

/// Response body for GET /api/exists/:key
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for POST /api/increment/:key
#[derive(Debug, Clone, Serialize)]
pub struct IncrementResponse {
    pub key: String,
    pub value: Number,
    pub amount: Number,
}

/// Response body for POST /api/update-ttl/:key
#[derive(Debug, Clone, Serialize)]
pub struct UpdateTtlResponse {
    pub success: bool,
    pub key: String,
    pub ttl: i64,
}

/// Response body for GET /api/keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Response body for POST /api/batch/set
#[derive(Debug, Clone, Serialize)]
pub struct BatchSetResponse {
    pub success: bool,
    pub count: usize,
}

/// Response body for POST /api/batch/get
///
/// `result` maps every requested key to its value, null for misses.
#[derive(Debug, Clone, Serialize)]
pub struct BatchGetResponse {
    pub result: Map<String, Value>,
    pub requested: usize,
    pub found: usize,
}

/// Response body for POST /api/batch/delete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResponse {
    /// Keys that were actually removed
    pub deleted: Vec<String>,
    pub requested: usize,
    pub deleted_count: usize,
}

/// Response body for GET /api/stats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Hit rate as a percentage, two decimal places
    pub hit_rate: f64,
    pub ops_per_second: u64,
    pub key_count: usize,
    pub current_bytes: usize,
    pub max_bytes: usize,
    pub memory_usage_percent: f64,
    /// RFC 3339 timestamp of the snapshot
    pub timestamp: String,
}

/// Response body for POST /api/stats/reset
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl ResetResponse {
    pub fn new() -> Self {
        Self {
            success: true,
            message: "Statistics reset".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Default for ResetResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for GET /api/config
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub eviction_policy: String,
    pub max_memory_mb: usize,
    pub max_keys: usize,
    pub cleanup_interval_ms: u64,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub enable_compression: bool,
    pub rate_limit_per_minute: u32,
    pub cors_origins: Vec<String>,
}

impl ConfigResponse {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            eviction_policy: config.eviction_policy.to_string(),
            max_memory_mb: config.max_memory_mb,
            max_keys: config.max_keys,
            cleanup_interval_ms: config.cleanup_interval_ms,
            port: config.port,
            environment: config.environment.clone(),
            log_level: config.log_level.clone(),
            enable_compression: config.enable_compression,
            rate_limit_per_minute: config.rate_limit_per_minute,
            cors_origins: config.cors_origins.clone(),
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub config: HealthConfig,
}

/// Condensed configuration block in health responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthConfig {
    pub eviction_policy: String,
    pub max_memory_mb: usize,
    pub max_keys: usize,
}

impl HealthResponse {
    pub fn healthy(uptime_seconds: u64, config: &crate::config::Config) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds,
            timestamp: chrono::Utc::now().to_rfc3339(),
            config: HealthConfig {
                eviction_policy: config.eviction_policy.to_string(),
                max_memory_mb: config.max_memory_mb,
                max_keys: config.max_keys,
            },
        }
    }
}

/// Response body for GET /health/detailed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    #[serde(flatten)]
    pub health: HealthResponse,
    pub cache: StatsResponse,
    pub system: SystemInfo,
}

/// Host process details for the detailed health view.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub platform: String,
    pub arch: String,
    pub pid: u32,
}

impl SystemInfo {
    pub fn current() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            pid: std::process::id(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}
