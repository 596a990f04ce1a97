//! Application state management
//!
//! The calculation is stateless, so the only shared resource is the
//! loaded configuration. It is read-only during request handling.

use crate::config::AppConfig;
use nutriweb_shared::CalculationOptions;
use std::sync::Arc;

/// Shared application state
///
/// Cloned into every handler; cloning is an `Arc` increment.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Formula variants configured for this deployment
    #[inline]
    pub fn default_options(&self) -> CalculationOptions {
        self.config.engine.options()
    }
}
