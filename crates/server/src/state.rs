//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;

use trade_query_config::{load_settings, Settings};
use trade_query_engine::TradeQueryEngine;

use crate::audit::{InMemoryInteractionLog, InteractionLog};
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Settings behind a lock so they can be reloaded
    pub config: Arc<RwLock<Settings>>,
    /// Engine, swapped wholesale on reload
    pub engine: Arc<RwLock<Arc<TradeQueryEngine>>>,
    pub interactions: Arc<dyn InteractionLog>,
    pub metrics: Option<PrometheusHandle>,
    env: Option<String>,
}

impl AppState {
    /// Build the engine from `config` with an in-memory interaction log
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let engine = TradeQueryEngine::from_settings(&config)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let capacity = if config.audit.enabled {
            config.audit.capacity
        } else {
            0
        };

        Ok(Self {
            engine: Arc::new(RwLock::new(Arc::new(engine))),
            interactions: Arc::new(InMemoryInteractionLog::new(capacity)),
            metrics: None,
            config: Arc::new(RwLock::new(config)),
            env: None,
        })
    }

    /// Environment name used by `reload_config`
    pub fn with_env(mut self, env: Option<String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_interaction_log(mut self, log: Arc<dyn InteractionLog>) -> Self {
        self.interactions = log;
        self
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Current engine; the returned handle stays valid across reloads
    pub fn engine(&self) -> Arc<TradeQueryEngine> {
        self.engine.read().clone()
    }

    /// Reload settings and rebuild the engine.
    ///
    /// Nothing is replaced unless both steps succeed.
    pub fn reload_config(&self) -> Result<(), ServerError> {
        let settings = load_settings(self.env.as_deref())
            .map_err(|e| ServerError::Internal(format!("failed to reload config: {}", e)))?;
        let engine = TradeQueryEngine::from_settings(&settings)
            .map_err(|e| ServerError::Internal(format!("failed to rebuild engine: {}", e)))?;

        *self.engine.write() = Arc::new(engine);
        *self.config.write() = settings;

        tracing::info!("Configuration reloaded successfully");
        Ok(())
    }

    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }
}
