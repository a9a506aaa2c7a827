//! TTL Sweeper Task
//!
//! Background task that periodically drains expired cache entries that no
//! access has touched. One sweep runs at a time: a tick that fires while the
//! previous sweep is still in flight is skipped, not queued. Shutdown waits
//! for an in-flight sweep to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

// == Sweeper ==
/// Periodic TTL sweeper over a shared cache store.
pub struct Sweeper {
    cache: Arc<RwLock<CacheStore>>,
    interval_ms: u64,
    handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl Sweeper {
    /// Creates a sweeper ticking every `interval_ms` milliseconds.
    pub fn new(cache: Arc<RwLock<CacheStore>>, interval_ms: u64) -> Self {
        Self {
            cache,
            interval_ms,
            handle: None,
            shutdown_tx: None,
        }
    }

    /// Spawns the sweep loop. Starting a running sweeper logs a warning and
    /// does nothing.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Sweeper already running, ignoring start");
            return;
        }

        info!(interval_ms = self.interval_ms, "Starting TTL sweeper");
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let cache = Arc::clone(&self.cache);
        let interval_ms = self.interval_ms.max(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            // Overlapping ticks are dropped rather than run back to back.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the first sweep should
            // happen one full interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = {
                            let mut cache = cache.write().await;
                            cache.cleanup_expired()
                        };
                        if removed > 0 {
                            info!(removed, "TTL sweep removed expired entries");
                        } else {
                            debug!("TTL sweep found no expired entries");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("TTL sweeper shutting down");
                        break;
                    }
                }
            }
        });

        self.handle = Some(handle);
        self.shutdown_tx = Some(shutdown_tx);
    }

    /// True while the sweep loop is spawned.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the tick loop and waits for an in-flight sweep to finish.
    pub async fn shutdown(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
            info!("TTL sweeper stopped");
        }
    }
}
