//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Handlers validate
//! at the boundary and hand validated input to the engine; absence comes back
//! as a negative result in the body, never as an error status.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::api::rate_limit::RateLimiter;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    BatchDeleteResponse, BatchGetResponse, BatchKeysRequest, BatchSetRequest, BatchSetResponse,
    ConfigResponse, DeleteResponse, DetailedHealthResponse, ExistsResponse, GetResponse,
    HealthResponse, IncrementRequest, IncrementResponse, KeysQuery, KeysResponse, ResetResponse,
    SetRequest, SetResponse, StatsResponse, SystemInfo, UpdateTtlRequest, UpdateTtlResponse,
};
use crate::models::requests::validate_key;

/// Application state shared across all handlers.
///
/// The cache store sits behind a single exclusive lock; critical sections are
/// one map probe and one list splice, and never await while held.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
    /// Immutable server configuration
    pub config: Arc<Config>,
    /// Per-IP request limiter
    pub rate_limiter: Arc<RateLimiter>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around an existing store.
    pub fn new(cache: CacheStore, config: Config) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_minute));
        Self {
            cache: Arc::new(RwLock::new(cache)),
            config: Arc::new(config),
            rate_limiter,
            started_at: Instant::now(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = CacheStore::new(
            config.eviction_policy,
            config.max_keys,
            config.max_memory_mb,
        );
        Self::new(cache, config.clone())
    }

    fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

// == Single-Key Operations ==

/// Handler for GET /api/get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    if let Some(msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(msg));
    }

    // Write lock: a hit promotes the key and updates counters.
    let mut cache = state.cache.write().await;
    let value = cache.get(&key);

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for POST /api/set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(msg) = req.validate() {
        return Err(CacheError::InvalidRequest(msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(&req.key, req.value, req.ttl.map(|t| t as u64));

    Ok(Json(SetResponse {
        success: true,
        key: req.key,
        ttl: req.ttl,
    }))
}

/// Handler for DELETE /api/delete/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if let Some(msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(msg));
    }

    let mut cache = state.cache.write().await;
    let success = cache.delete(&key);

    Ok(Json(DeleteResponse { success, key }))
}

/// Handler for GET /api/exists/:key
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ExistsResponse> {
    let mut cache = state.cache.write().await;
    let exists = cache.exists(&key);

    Json(ExistsResponse { key, exists })
}

/// Handler for POST /api/increment/:key
///
/// The body is optional; a bare POST increments by 1.
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Option<Json<IncrementRequest>>,
) -> Result<Json<IncrementResponse>> {
    if let Some(msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(msg));
    }
    let amount = body
        .map(|Json(req)| req.amount())
        .unwrap_or_else(|| serde_json::Number::from(1));

    let mut cache = state.cache.write().await;
    let value = cache.increment(&key, &amount)?;

    Ok(Json(IncrementResponse { key, value, amount }))
}

/// Handler for POST /api/update-ttl/:key
pub async fn update_ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateTtlRequest>,
) -> Result<Json<UpdateTtlResponse>> {
    if let Some(msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(msg));
    }
    if let Some(msg) = req.validate() {
        return Err(CacheError::InvalidRequest(msg));
    }

    let mut cache = state.cache.write().await;
    let success = cache.update_ttl(&key, req.ttl as u64);

    Ok(Json(UpdateTtlResponse {
        success,
        key,
        ttl: req.ttl,
    }))
}

/// Handler for GET /api/keys
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Json<KeysResponse> {
    let limit = query.limit();
    let offset = query.offset();

    let cache = state.cache.read().await;
    let (keys, total) = cache.keys(limit, offset);

    Json(KeysResponse {
        keys,
        total,
        limit,
        offset,
    })
}

// == Batch Operations ==

/// Handler for POST /api/batch/set
///
/// Applies the entries in order with single-key semantics; the batch is not
/// atomic as a whole.
pub async fn batch_set_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchSetRequest>,
) -> Result<Json<BatchSetResponse>> {
    if let Some(msg) = req.validate() {
        return Err(CacheError::InvalidRequest(msg));
    }

    let count = req.entries.len();
    let mut cache = state.cache.write().await;
    for entry in req.entries {
        cache.set(&entry.key, entry.value, entry.ttl.map(|t| t as u64));
    }

    Ok(Json(BatchSetResponse {
        success: true,
        count,
    }))
}

/// Handler for POST /api/batch/get
pub async fn batch_get_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchKeysRequest>,
) -> Result<Json<BatchGetResponse>> {
    if let Some(msg) = req.validate() {
        return Err(CacheError::InvalidRequest(msg));
    }

    let requested = req.keys.len();
    let mut result = Map::with_capacity(requested);
    let mut found = 0;

    let mut cache = state.cache.write().await;
    for key in req.keys {
        let value = cache.get(&key);
        if value.is_some() {
            found += 1;
        }
        result.insert(key, value.unwrap_or(Value::Null));
    }

    Ok(Json(BatchGetResponse {
        result,
        requested,
        found,
    }))
}

/// Handler for POST /api/batch/delete
pub async fn batch_delete_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchKeysRequest>,
) -> Result<Json<BatchDeleteResponse>> {
    if let Some(msg) = req.validate() {
        return Err(CacheError::InvalidRequest(msg));
    }

    let requested = req.keys.len();
    let mut deleted = Vec::new();

    let mut cache = state.cache.write().await;
    for key in req.keys {
        if cache.delete(&key) {
            deleted.push(key);
        }
    }

    Ok(Json(BatchDeleteResponse {
        deleted_count: deleted.len(),
        deleted,
        requested,
    }))
}

// == Statistics and Introspection ==

fn stats_snapshot(cache: &mut CacheStore) -> StatsResponse {
    let ops_per_second = cache.ops_per_second();
    let stats = cache.stats();
    StatsResponse {
        hits: stats.hits,
        misses: stats.misses,
        evictions: stats.evictions,
        expirations: stats.expirations,
        hit_rate: stats.hit_rate(),
        ops_per_second,
        key_count: cache.len(),
        current_bytes: cache.current_bytes(),
        max_bytes: cache.max_bytes(),
        memory_usage_percent: cache.memory_usage_percent(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut cache = state.cache.write().await;
    Json(stats_snapshot(&mut cache))
}

/// Handler for POST /api/stats/reset
pub async fn stats_reset_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    let mut cache = state.cache.write().await;
    cache.reset_stats();

    Json(ResetResponse::new())
}

/// Handler for GET /api/config
pub async fn config_handler(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse::from_config(&state.config))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.uptime_seconds(),
        &state.config,
    ))
}

/// Handler for GET /health/detailed
pub async fn detailed_health_handler(
    State(state): State<AppState>,
) -> Json<DetailedHealthResponse> {
    let cache = {
        let mut cache = state.cache.write().await;
        stats_snapshot(&mut cache)
    };

    Json(DetailedHealthResponse {
        health: HealthResponse::healthy(state.uptime_seconds(), &state.config),
        cache,
        system: SystemInfo::current(),
    })
}

/// Fallback for unknown routes.
pub async fn fallback_handler() -> CacheError {
    CacheError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PolicyKind;
    use serde_json::json;

    fn test_state() -> AppState {
        let config = Config::default();
        let cache = CacheStore::new(PolicyKind::Lru, 100, 64);
        AppState::new(cache, config)
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "test_key".to_string(),
            value: json!({"nested": true}),
            ttl: None,
        };
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let Json(response) = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert!(response.exists);
        assert_eq!(response.value, Some(json!({"nested": true})));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_an_error() {
        let state = test_state();

        let Json(response) = get_handler(State(state), Path("nope".to_string()))
            .await
            .unwrap();
        assert!(!response.exists);
        assert_eq!(response.value, None);
    }

    #[tokio::test]
    async fn test_delete_handler_reports_absence() {
        let state = test_state();

        let req = SetRequest {
            key: "to_delete".to_string(),
            value: json!(1),
            ttl: None,
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let Json(first) = delete_handler(State(state.clone()), Path("to_delete".to_string()))
            .await
            .unwrap();
        assert!(first.success);

        let Json(second) = delete_handler(State(state), Path("to_delete".to_string()))
            .await
            .unwrap();
        assert!(!second.success);
    }

    #[tokio::test]
    async fn test_increment_handler_defaults_to_one() {
        let state = test_state();

        let Json(response) = increment_handler(State(state), Path("counter".to_string()), None)
            .await
            .unwrap();
        assert_eq!(response.value, serde_json::Number::from(1));
        assert_eq!(response.amount, serde_json::Number::from(1));
    }

    #[tokio::test]
    async fn test_increment_handler_non_numeric_is_error() {
        let state = test_state();

        let req = SetRequest {
            key: "s".to_string(),
            value: json!("text"),
            ttl: None,
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let result = increment_handler(State(state), Path("s".to_string()), None).await;
        assert!(matches!(result, Err(CacheError::NonNumeric(_))));
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let req = SetRequest {
            key: "".to_string(),
            value: json!(1),
            ttl: None,
        };
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler_reflects_accesses() {
        let state = test_state();

        let req = SetRequest {
            key: "k".to_string(),
            value: json!(1),
            ttl: None,
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();
        get_handler(State(state.clone()), Path("k".to_string()))
            .await
            .unwrap();
        get_handler(State(state.clone()), Path("miss".to_string()))
            .await
            .unwrap();

        let Json(response) = stats_handler(State(state)).await;
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.hit_rate, 50.0);
        assert_eq!(response.key_count, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = test_state();
        let Json(response) = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
    }
}
