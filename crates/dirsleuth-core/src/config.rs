/// Analyzer configuration: category table, compression profile and scan
/// options.
///
/// Every field defaults to the built-in values, so `{}` is a complete
/// config file. A loaded config is validated once and then shared
/// read-only for the life of the process.
use crate::analysis::{Category, CategoryTable, CompressionProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ratio {ratio} for '{algorithm}' ({category}) must lie strictly between 0 and 1")]
    InvalidRatio {
        category: Category,
        algorithm: String,
        ratio: f64,
    },

    #[error("extension '{extension}' is listed under both {first} and {second}")]
    DuplicateExtension {
        extension: String,
        first: Category,
        second: Category,
    },

    #[error("empty algorithm name in the {0} profile")]
    EmptyName(Category),
}

/// Options for the scanner that do not change results, only how they are
/// computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Remember folder sizes keyed by (path, modification time) and reuse
    /// them on later scans in the same process.
    pub memoize_folder_sizes: bool,
    /// Size subfolders with a parallel walker instead of a serial one.
    pub parallel_sizing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub categories: CategoryTable,
    pub compression: CompressionProfile,
    pub scan: ScanSettings,
}

impl AnalyzerConfig {
    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject ratios outside (0, 1), empty algorithm names and extensions
    /// claimed by two categories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for profile in self.compression.categories() {
            if profile.algorithms.iter().any(|a| a.algorithm.trim().is_empty()) {
                return Err(ConfigError::EmptyName(profile.category));
            }
        }
        if let Some((category, algorithm, ratio)) = self.compression.first_invalid_ratio() {
            return Err(ConfigError::InvalidRatio {
                category,
                algorithm: algorithm.to_string(),
                ratio,
            });
        }
        if let Some((extension, first, second)) = self.categories.first_overlap() {
            return Err(ConfigError::DuplicateExtension {
                extension,
                first,
                second,
            });
        }
        Ok(())
    }

    /// Pretty JSON, suitable as a starting point for a config file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
