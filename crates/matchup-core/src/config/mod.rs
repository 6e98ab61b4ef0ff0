//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `matchup.toml` file
//! 3. User config `~/.config/matchup/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graph store connection.
    pub store: StoreConfig,

    /// Curated source file locations.
    pub data: DataConfig,

    /// Export artifact locations.
    pub export: ExportConfig,

    /// Skip all store writes when set.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            data: DataConfig::default(),
            export: ExportConfig::default(),
            dry_run: false,
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./matchup.toml` (project local)
    /// 2. `~/.config/matchup/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("matchup.toml").exists() {
            return Self::from_file("matchup.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("matchup").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(uri) = std::env::var("MATCHUP_STORE_URI") {
            self.store.uri = uri;
        }
        if let Ok(user) = std::env::var("MATCHUP_STORE_USER") {
            self.store.username = Some(user);
        }
        if let Ok(password) = std::env::var("MATCHUP_STORE_PASSWORD") {
            self.store.password = Some(password);
        }
        if let Ok(root) = std::env::var("MATCHUP_DATA_ROOT") {
            self.data.data_root = PathBuf::from(root);
        }
        if let Ok(dir) = std::env::var("MATCHUP_TEMP_DIR") {
            self.data.temp_dir = PathBuf::from(dir);
        }
        if let Ok(flag) = std::env::var("MATCHUP_DRY_RUN") {
            self.dry_run = matches!(flag.as_str(), "1" | "true" | "yes");
        }
    }
}

/// Graph store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store endpoint URI (`ws://`, `rocksdb://`, `mem://`).
    pub uri: String,

    /// Optional root username.
    pub username: Option<String>,

    /// Optional root password.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Namespace to select after connecting.
    pub namespace: String,

    /// Database to select after connecting.
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_STORE_URI.to_string(),
            username: None,
            password: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

/// Curated source file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root directory holding the YAML sources.
    pub data_root: PathBuf,

    /// Directory for pre-ingestion checkpoints.
    pub temp_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
        }
    }
}

impl DataConfig {
    /// Directory holding one YAML document per character.
    pub fn characters_dir(&self) -> PathBuf {
        self.data_root.join("characters")
    }

    /// The archetype baseline file.
    pub fn archetypes_file(&self) -> PathBuf {
        self.data_root.join("archetypes.yaml")
    }

    /// The mechanic baseline file.
    pub fn mechanics_file(&self) -> PathBuf {
        self.data_root.join("mechanics.yaml")
    }

    /// The roster/status list file.
    pub fn roster_file(&self) -> PathBuf {
        self.data_root.join("character_list.yaml")
    }

    /// Checkpoint path for a character slug.
    pub fn checkpoint_path(&self, slug: &str) -> PathBuf {
        self.temp_dir.join(format!("temp_ingest_{slug}.json"))
    }
}

/// Export artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Relationship table path.
    pub matchups_file: PathBuf,

    /// Static graph artifact path.
    pub graph_file: PathBuf,

    /// Directory where archived tables accumulate.
    pub history_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            matchups_file: PathBuf::from(DEFAULT_MATCHUPS_FILE),
            graph_file: PathBuf::from(DEFAULT_GRAPH_FILE),
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
        }
    }
}
