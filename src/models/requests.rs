//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and the validation
//! rules applied at the boundary. The engine itself assumes validated input.

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::cache::{MAX_BATCH_SIZE, MAX_KEY_LENGTH, MAX_TTL_MS};

// == Shared Validation ==
/// Validates a cache key: non-empty, at most 256 bytes.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Validates a TTL: integer milliseconds in [1, 86_400_000].
pub fn validate_ttl(ttl: i64) -> Option<String> {
    if ttl < 1 || ttl as u64 > MAX_TTL_MS {
        return Some(format!("TTL must be between 1 and {} milliseconds", MAX_TTL_MS));
    }
    None
}

/// Validates a batch length: between 1 and 100 elements.
pub fn validate_batch_len(len: usize) -> Option<String> {
    if len < 1 || len > MAX_BATCH_SIZE {
        return Some(format!(
            "Batch size must be between 1 and {} elements",
            MAX_BATCH_SIZE
        ));
    }
    None
}

// == Set ==
/// Request body for POST /api/set
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store (any JSON shape)
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = validate_key(&self.key) {
            return Some(msg);
        }
        if let Some(ttl) = self.ttl {
            if let Some(msg) = validate_ttl(ttl) {
                return Some(msg);
            }
        }
        None
    }
}

// == Increment ==
/// Request body for POST /api/increment/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncrementRequest {
    /// Amount to add; defaults to 1
    #[serde(default)]
    pub amount: Option<Number>,
}

impl IncrementRequest {
    /// The effective amount, applying the default of 1.
    pub fn amount(&self) -> Number {
        self.amount.clone().unwrap_or_else(|| Number::from(1))
    }
}

// == Update TTL ==
/// Request body for POST /api/update-ttl/:key
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTtlRequest {
    /// New TTL in milliseconds
    pub ttl: i64,
}

impl UpdateTtlRequest {
    pub fn validate(&self) -> Option<String> {
        validate_ttl(self.ttl)
    }
}

// == Keys ==
/// Query parameters for GET /api/keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl KeysQuery {
    /// Effective limit, defaulted to 100 and clamped to [1, 1000].
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(100).clamp(1, 1000)
    }

    /// Effective offset, defaulted to 0.
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

// == Batch Set ==
/// One entry of a batch set.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSetEntry {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<i64>,
}

/// Request body for POST /api/batch/set
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSetRequest {
    pub entries: Vec<BatchSetEntry>,
}

impl BatchSetRequest {
    /// Returns an error message if validation fails, None if valid.
    ///
    /// The whole batch is validated up front; a batch with any invalid
    /// element is rejected before the first write.
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = validate_batch_len(self.entries.len()) {
            return Some(msg);
        }
        for entry in &self.entries {
            if let Some(msg) = validate_key(&entry.key) {
                return Some(msg);
            }
            if let Some(ttl) = entry.ttl {
                if let Some(msg) = validate_ttl(ttl) {
                    return Some(msg);
                }
            }
        }
        None
    }
}

// == Batch Get / Delete ==
/// Request body for POST /api/batch/get and /api/batch/delete
#[derive(Debug, Clone, Deserialize)]
pub struct BatchKeysRequest {
    pub keys: Vec<String>,
}

impl BatchKeysRequest {
    pub fn validate(&self) -> Option<String> {
        if let Some(msg) = validate_batch_len(self.keys.len()) {
            return Some(msg);
        }
        for key in &self.keys {
            if let Some(msg) = validate_key(key) {
                return Some(msg);
            }
        }
        None
    }
}
