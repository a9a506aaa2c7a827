//! API Routes
//!
//! Configures the Axum router with all cache server endpoints and the
//! middleware stack (rate limiting, CORS, request tracing, compression).

use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_delete_handler, batch_get_handler, batch_set_handler, config_handler, delete_handler,
    detailed_health_handler, exists_handler, fallback_handler, get_handler, health_handler,
    increment_handler, keys_handler, set_handler, stats_handler, stats_reset_handler,
    update_ttl_handler, AppState,
};
use super::rate_limit::rate_limit_middleware;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/get/:key` / `POST /api/set` / `DELETE /api/delete/:key`
/// - `GET /api/exists/:key` / `POST /api/increment/:key`
/// - `POST /api/update-ttl/:key` / `GET /api/keys`
/// - `POST /api/batch/{set,get,delete}`
/// - `GET /api/stats` / `POST /api/stats/reset` / `GET /api/config`
/// - `GET /health` / `GET /health/detailed`
///
/// Unknown routes fall through to a JSON 404.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    let mut router = Router::new()
        .route("/api/get/:key", get(get_handler))
        .route("/api/set", post(set_handler))
        .route("/api/delete/:key", delete(delete_handler))
        .route("/api/exists/:key", get(exists_handler))
        .route("/api/increment/:key", post(increment_handler))
        .route("/api/update-ttl/:key", post(update_ttl_handler))
        .route("/api/keys", get(keys_handler))
        .route("/api/batch/set", post(batch_set_handler))
        .route("/api/batch/get", post(batch_get_handler))
        .route("/api/batch/delete", post(batch_delete_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/stats/reset", post(stats_reset_handler))
        .route("/api/config", get(config_handler))
        .route("/health", get(health_handler))
        .route("/health/detailed", get(detailed_health_handler))
        .fallback(fallback_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    if state.config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    router.with_state(state)
}

/// Builds the CORS layer from the configured origin list; `*` allows any.
fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if state.config.cors_origins.iter().any(|origin| origin == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
