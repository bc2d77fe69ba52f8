use crate::errors::{PushError, PushResult};
use crate::shared::clients::Endpoint;
use directories::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};

// Re-export shared types for convenience
pub use crate::shared::config::{
    CertificateConfig, Config, DefaultsConfig, GatewayConfig, LoggingConfig,
};

const CONFIG_DIR: &str = ".apns-push";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
///
/// Handles loading, saving, and managing configuration for both project-level
/// and global configurations. Project configurations take precedence over global ones.
///
/// # Configuration Hierarchy
///
/// 1. **Project-level**: `.apns-push/config.toml` in project root
/// 2. **Global**: `~/.apns-push/config.toml` in user home directory
///
/// # Example
///
/// ```rust,no_run
/// use apns_push::config::ConfigManager;
/// use std::path::PathBuf;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config_manager = ConfigManager::new(Some(PathBuf::from("/path/to/project")))?;
///     println!("Endpoint: {:?}", config_manager.config().gateway.endpoint);
///     Ok(())
/// }
/// ```
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Creates a new ConfigManager instance
    ///
    /// With a project path, the project configuration is used when it exists,
    /// then the global one; if neither exists the project path is targeted
    /// with default settings. Without a project path the global configuration
    /// is used. Nothing is written until [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The home directory cannot be determined
    /// - The configuration file cannot be read or parsed
    pub fn new(project_path: Option<PathBuf>) -> PushResult<Self> {
        if let Some(ref path) = project_path {
            let project_config_path = Self::get_config_path(Some(path.clone()))?;
            if project_config_path.exists() {
                return Self::open(project_config_path);
            }

            let global_config_path = Self::get_config_path(None)?;
            if global_config_path.exists() {
                return Self::open(global_config_path);
            }

            Self::open(project_config_path)
        } else {
            Self::open(Self::get_config_path(None)?)
        }
    }

    /// Always use the project-level configuration.
    pub fn new_project_config(project_path: PathBuf) -> PushResult<Self> {
        Self::open(Self::get_config_path(Some(project_path))?)
    }

    /// Load a configuration from an explicit file, or defaults if absent.
    pub fn open(config_path: PathBuf) -> PushResult<Self> {
        let config = Self::load_or_default(&config_path)?;
        Ok(ConfigManager {
            config_path,
            config,
        })
    }

    pub fn get_config_path(project_path: Option<PathBuf>) -> PushResult<PathBuf> {
        let base_path = if let Some(path) = project_path {
            path.join(CONFIG_DIR)
        } else {
            let base_dirs = BaseDirs::new()
                .ok_or_else(|| PushError::config("Failed to get base directories"))?;
            base_dirs.home_dir().join(CONFIG_DIR)
        };

        Ok(base_path.join(CONFIG_FILE))
    }

    fn load_or_default(path: &Path) -> PushResult<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| PushError::io_with_source(path, "read config file", e))?;
        toml::from_str(&content)
            .map_err(|e| PushError::config_with_source("Failed to parse config file", e))
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Saves the current configuration to disk
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written.
    pub fn save(&self) -> PushResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| PushError::io_with_source(parent, "create config directory", e))?;
        }
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| PushError::config_with_source("Failed to serialize config", e))?;
        fs::write(&self.config_path, content)
            .map_err(|e| PushError::io_with_source(&self.config_path, "write config file", e))?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access; call [`save()`](Self::save) to persist changes.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Read a dotted key such as `gateway.endpoint`.
    pub fn get(&self, key: &str) -> PushResult<String> {
        let config = &self.config;
        let value = match key {
            "gateway.endpoint" => endpoint_name(config.gateway.endpoint).to_string(),
            "gateway.host" => config.gateway.host.clone().unwrap_or_default(),
            "gateway.connect_timeout_secs" => config.gateway.connect_timeout_secs.to_string(),
            "gateway.request_timeout_secs" => config.gateway.request_timeout_secs.to_string(),
            "gateway.proxy_url" => config.gateway.proxy_url.clone().unwrap_or_default(),
            "certificate.path" => config
                .certificate
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "defaults.topic" => config.defaults.topic.clone().unwrap_or_default(),
            "defaults.priority" => config
                .defaults
                .priority
                .map(|p| p.to_string())
                .unwrap_or_default(),
            "logging.level" => config.logging.level.clone(),
            "logging.log_path" => config
                .logging
                .log_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            _ => return Err(PushError::config(format!("Unknown configuration key: {key}"))),
        };
        Ok(value)
    }

    /// Set a dotted key. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> PushResult<()> {
        let config = &mut self.config;
        match key {
            "gateway.endpoint" => {
                config.gateway.endpoint = match value {
                    "development" => Endpoint::Development,
                    "production" => Endpoint::Production,
                    other => {
                        return Err(PushError::config(format!(
                            "endpoint must be 'development' or 'production', got '{other}'"
                        )))
                    }
                }
            }
            "gateway.host" => config.gateway.host = optional(value),
            "gateway.connect_timeout_secs" => {
                config.gateway.connect_timeout_secs = parse_value(key, value)?
            }
            "gateway.request_timeout_secs" => {
                config.gateway.request_timeout_secs = parse_value(key, value)?
            }
            "gateway.proxy_url" => config.gateway.proxy_url = optional(value),
            "certificate.path" => config.certificate.path = optional(value).map(PathBuf::from),
            "defaults.topic" => config.defaults.topic = optional(value),
            "defaults.priority" => {
                config.defaults.priority = match optional(value) {
                    Some(v) => Some(parse_value(key, &v)?),
                    None => None,
                }
            }
            "logging.level" => config.logging.level = value.to_string(),
            "logging.log_path" => config.logging.log_path = optional(value).map(PathBuf::from),
            _ => return Err(PushError::config(format!("Unknown configuration key: {key}"))),
        }
        Ok(())
    }
}

fn endpoint_name(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Development => "development",
        Endpoint::Production => "production",
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_value<T>(key: &str, value: &str) -> PushResult<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        PushError::config_with_source(format!("Invalid value for '{key}': {value}"), e)
    })
}
