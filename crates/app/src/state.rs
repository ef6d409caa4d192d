use std::fs;
use std::path::PathBuf;

use common::crypto::{EncryptionKey, TransformError};
use common::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "cfs";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CACHE_DIR_NAME: &str = "data";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the remote store
    #[serde(default)]
    pub remote: Option<Url>,
    /// Local cache directory (defaults to the platform cache dir)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub hash_type: HashAlgorithm,
    /// Hex-encoded AES-256 key for encrypted entries
    #[serde(default)]
    pub encrypt_key: String,
    /// Hex-encoded IV for encrypted entries
    #[serde(default)]
    pub encrypt_iv: String,
    /// Check downloaded bytes against their hash before caching
    #[serde(default = "default_verify_integrity")]
    pub verify_integrity: bool,
}

fn default_verify_integrity() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: None,
            cache_dir: None,
            hash_type: HashAlgorithm::default(),
            encrypt_key: String::new(),
            encrypt_iv: String::new(),
            verify_integrity: default_verify_integrity(),
        }
    }
}

impl AppConfig {
    /// Key material, or `None` if neither key nor IV is configured
    pub fn encryption_key(&self) -> Result<Option<EncryptionKey>, StateError> {
        if self.encrypt_key.is_empty() && self.encrypt_iv.is_empty() {
            return Ok(None);
        }
        Ok(Some(EncryptionKey::from_hex(
            &self.encrypt_key,
            &self.encrypt_iv,
        )?))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the cfs directory (~/.cfs)
    pub cfs_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration, or defaults when there is no config file
    pub config: AppConfig,
}

impl AppState {
    /// Get the cfs directory path (custom or default ~/.cfs)
    pub fn cfs_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let cfs_dir = Self::cfs_dir(custom_path)?;
        let config_path = cfs_dir.join(CONFIG_FILE_NAME);

        let config = if config_path.exists() {
            let config_toml = fs::read_to_string(&config_path)?;
            toml::from_str(&config_toml)?
        } else {
            AppConfig::default()
        };

        Ok(Self {
            cfs_dir,
            config_path,
            config,
        })
    }

    /// Configured cache directory, falling back to `<cache dir>/cfs/data`
    pub fn cache_dir(&self) -> Result<PathBuf, StateError> {
        if let Some(dir) = &self.config.cache_dir {
            return Ok(dir.clone());
        }
        let cache = dirs::cache_dir().ok_or(StateError::NoCacheDirectory)?;
        Ok(cache.join(APP_NAME).join(CACHE_DIR_NAME))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("no cache directory found, set cache_dir or pass --cache-dir")]
    NoCacheDirectory,

    #[error("invalid key material: {0}")]
    InvalidKey(#[from] TransformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
