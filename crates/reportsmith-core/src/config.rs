//! Studio configuration

use anyhow::Context;
use reportsmith_export::PageGeometry;
use reportsmith_pipeline::PipelineConfig;
use reportsmith_store::FieldConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for one editing session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Quiescence window for debounced durable writes, in milliseconds
    pub quiescence_ms: u64,
    /// Settle delay before artifact capture, in milliseconds
    pub settle_delay_ms: u64,
    /// Entries kept in the fingerprint-to-raster reuse cache
    pub raster_cache_capacity: u64,
    /// Export page geometry
    pub page: PageGeometry,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: 300,
            settle_delay_ms: 250,
            raster_cache_capacity: 32,
            page: PageGeometry::default(),
        }
    }
}

impl StudioConfig {
    /// Default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the debounce quiescence window
    #[must_use]
    pub fn with_quiescence(mut self, window: Duration) -> Self {
        self.quiescence_ms = window.as_millis() as u64;
        self
    }

    /// Override the capture settle delay
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Override the export page geometry
    #[must_use]
    pub fn with_page_geometry(mut self, page: PageGeometry) -> Self {
        self.page = page;
        self
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Field-store tuning derived from this config
    #[must_use]
    pub fn field_config(&self) -> FieldConfig {
        FieldConfig {
            quiescence: Duration::from_millis(self.quiescence_ms),
        }
    }

    /// Pipeline tuning derived from this config
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            cache_capacity: self.raster_cache_capacity,
        }
    }
}
