//! Configuration management for ewa-cache

pub mod schema;

pub use schema::Config;

use crate::error::{EwaError, EwaResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "ewa.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for `ewa.toml` in the current directory
    pub fn new() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILE),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Search `start` and its ancestors for a project config file
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> EwaResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration, failing if the file does not exist
    pub async fn load_existing(&self) -> EwaResult<Config> {
        if !self.config_path.is_file() {
            return Err(EwaError::ConfigNotFound(self.config_path.clone()));
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    ///
    /// A relative `paths.root` is resolved against the file's directory.
    pub async fn load_from_file(&self, path: &Path) -> EwaResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| EwaError::io(format!("reading config from {}", path.display()), e))?;

        let mut config: Config = toml::from_str(&content).map_err(|e| EwaError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if config.paths.root.is_relative() {
            if let Some(dir) = path.parent() {
                config.paths.root = dir.join(&config.paths.root);
            }
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> EwaResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            EwaError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> EwaResult<()> {
        if let Some(parent) = self.config_path.parent() {
            if parent.as_os_str().is_empty() {
                return Ok(());
            }
            fs::create_dir_all(parent)
                .await
                .map_err(|e| EwaError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
