//! Configuration module for volpipe
//!
//! A [`PipelineConfig`] describes the resampling nodes of a pipeline and how
//! batches are prefetched. It is stored as JSON (primary format) or TOML,
//! chosen by file extension.
//!
//! # Example
//!
//! ```toml
//! [[downsample]]
//! input = "raw"
//! factor = 2
//! output = "raw_2"
//!
//! [[downsample]]
//! input = "labels"
//! factor = [1, 2, 2]
//! output = "labels_2"
//!
//! [prefetch]
//! workers = 4
//! cache_size = 10
//! ```
//!
//! Factors must be a positive integer or a list of positive integers; any
//! other value fails to load with a configuration error.

use crate::error::{Result, VolpipeError};
use crate::pipeline::nodes::{DownSample, DownSampleEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of prefetch worker threads
pub const DEFAULT_PREFETCH_WORKERS: usize = 4;

/// Default number of batches kept ready by the prefetcher
pub const DEFAULT_PREFETCH_CACHE_SIZE: usize = 10;

/// TOML file extension; everything else is read as JSON
pub const TOML_EXTENSION: &str = "toml";

// ==================== Prefetch Settings ====================

/// Settings for [`BatchPrefetcher`](crate::pipeline::BatchPrefetcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Number of worker threads requesting batches
    pub workers: usize,

    /// Maximum number of finished batches waiting for the consumer
    pub cache_size: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_PREFETCH_WORKERS,
            cache_size: DEFAULT_PREFETCH_CACHE_SIZE,
        }
    }
}

impl PrefetchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(VolpipeError::Configuration(
                "prefetch needs at least one worker".to_string(),
            ));
        }
        if self.cache_size == 0 {
            return Err(VolpipeError::Configuration(
                "prefetch cache size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== Pipeline Config ====================

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Resampling jobs, all served by one `DownSample` node
    pub downsample: Vec<DownSampleEntry>,

    /// Background prefetching
    pub prefetch: PrefetchConfig,
}

impl PipelineConfig {
    /// Load a configuration file. `.toml` files are parsed as TOML, anything
    /// else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VolpipeError::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config = if is_toml(path) {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
        .map_err(|e| e.with_context(format!("Failed to parse config file {:?}", path)))?;

        tracing::info!(
            "Loaded pipeline config from {:?}: {} downsample entries",
            path,
            config.downsample.len()
        );
        Ok(config)
    }

    /// Save to `path`, in TOML or JSON depending on the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                VolpipeError::Configuration(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| VolpipeError::Serialization(format!("Failed to serialize config: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| VolpipeError::Serialization(format!("Failed to serialize config: {}", e)))?
        };

        std::fs::write(path, content).map_err(|e| {
            VolpipeError::Configuration(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| VolpipeError::Configuration(format!("invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| VolpipeError::Configuration(format!("invalid TOML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration without building anything.
    pub fn validate(&self) -> Result<()> {
        self.prefetch.validate()?;
        if !self.downsample.is_empty() {
            DownSample::new(self.downsample.iter().cloned())?;
        }
        Ok(())
    }

    /// The configured `DownSample` node, or `None` if no entries are given.
    pub fn build_downsample(&self) -> Result<Option<DownSample>> {
        if self.downsample.is_empty() {
            return Ok(None);
        }
        DownSample::new(self.downsample.iter().cloned()).map(Some)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(TOML_EXTENSION))
}
