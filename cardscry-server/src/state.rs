//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use cardscry_core::Catalog;

use crate::config::Config;
use crate::validation::DEFAULT_MAX_FILE_SIZE;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Card catalog for fingerprint lookups; None runs the API in degraded
    /// mode where /scry answers 503
    pub catalog: Option<Arc<dyn Catalog>>,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl AppState {
    /// State with no catalog attached (degraded mode).
    pub fn new() -> Self {
        Self {
            catalog: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// State backed by a catalog.
    pub fn with_catalog(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog: Some(catalog),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Apply config-driven limits.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.max_file_size = config.max_file_size_bytes();
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
