// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! release_policy = "best-effort"   # or "reject-while-exported"
//! max_dimensions = 64
//! track_stats = true
//! default_read_only = false
//! ```

use buffer_descriptor::MAX_DIMENSIONS;
use memoryview::ReleasePolicy;
use std::path::Path;

/// Configuration for the view runtime.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// What releasing a view with live exports does.
    #[serde(default)]
    pub release_policy: ReleasePolicy,
    /// Highest rank a view may have. At most 64.
    #[serde(default = "default_max_dimensions")]
    pub max_dimensions: usize,
    /// Whether buffers go through a registry that records release stats.
    #[serde(default = "default_true")]
    pub track_stats: bool,
    /// Read-only flag for views over runtime-allocated buffers.
    #[serde(default)]
    pub default_read_only: bool,
}

fn default_max_dimensions() -> usize {
    MAX_DIMENSIONS
}

fn default_true() -> bool {
    true
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }

    /// Rejects out-of-range values.
    pub fn validate(&self) -> Result<(), super::RuntimeError> {
        if self.max_dimensions > MAX_DIMENSIONS {
            return Err(super::RuntimeError::ConfigError(format!(
                "max_dimensions {} exceeds the limit of {MAX_DIMENSIONS}",
                self.max_dimensions
            )));
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            release_policy: ReleasePolicy::BestEffort,
            max_dimensions: MAX_DIMENSIONS,
            track_stats: true,
            default_read_only: false,
        }
    }
}
