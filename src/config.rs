//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/breakertree/breakertree.toml`
//! 3. Local config: `<dir>/.breakertree.toml` (usually the working directory)
//! 4. Environment variables: `BREAKERTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_KIND;
use crate::util::path::{expand_env_vars, resolve_against};

/// Unified configuration for breakertree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Node store file (default: ~/.breakertree/nodes.toml)
    pub store_path: PathBuf,
    /// Node kind the hierarchy operates on
    pub kind: String,
    /// Worker threads for batch updates (default: rayon's global pool)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_threads: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            kind: DEFAULT_KIND.to_string(),
            batch_threads: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub kind: Option<String>,
    pub batch_threads: Option<usize>,
}

/// Get the default store file (~/.breakertree/nodes.toml).
fn default_store_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".breakertree").join("nodes.toml"))
        .unwrap_or_else(|| PathBuf::from("~/.breakertree/nodes.toml"))
}

/// Get the XDG config directory for breakertree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "breakertree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("breakertree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".breakertree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_path.to_string_lossy().as_ref());
        self.store_path = PathBuf::from(expanded);
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            kind: overlay.kind.clone().unwrap_or_else(|| self.kind.clone()),
            batch_threads: overlay.batch_threads.or(self.batch_threads),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.breakertree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let local = local_dir
            .map(local_config_path)
            .filter(|p| p.exists());
        let mut settings = Self::load_from(global.as_deref(), local.as_deref())?;
        // Relative store paths are anchored at the local directory
        if let Some(dir) = local_dir {
            settings.store_path = resolve_against(dir, &settings.store_path);
        }
        Ok(settings)
    }

    /// Load settings from explicit config files (each optional).
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global {
            current = current.merge_with(&load_raw_settings(path)?);
        }
        if let Some(path) = local {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply BREAKERTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("BREAKERTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("kind") {
            settings.kind = val;
        }
        if let Ok(val) = config.get::<usize>("batch_threads") {
            settings.batch_threads = Some(val);
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.kind.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "kind must not be empty".to_string(),
            });
        }
        if self.batch_threads == Some(0) {
            return Err(ApplicationError::Config {
                message: "batch_threads must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
