//! Configuration Management
//!
//! Optional on-disk defaults for craton. Values here sit below command-line
//! flags and environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Base URL of the Craton service
    #[serde(default)]
    pub craton_url: Option<String>,
    /// Project scope used when none is given on the command line
    #[serde(default)]
    pub project_id: Option<i64>,
    /// Username used when none is given on the command line
    #[serde(default)]
    pub username: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("craton").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Effective base URL (CLI/env > config)
    pub fn effective_url(&self, resolved: Option<String>) -> Option<String> {
        resolved.or_else(|| self.craton_url.clone())
    }

    /// Effective username (CLI/env > config)
    pub fn effective_username(&self, resolved: Option<String>) -> Option<String> {
        resolved.or_else(|| self.username.clone())
    }

    /// Effective project id. `explicit` is `None` when only the built-in
    /// default was available.
    pub fn effective_project_id(&self, explicit: Option<i64>, default: i64) -> i64 {
        explicit.or(self.project_id).unwrap_or(default)
    }
}
