//! Configuration management for lexreport
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Listening-practice backend
    #[serde(default)]
    pub listen: ListenConfig,

    /// Report builder backend
    #[serde(default)]
    pub report: ReportConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Listening-practice backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Base URL serving /user/words and /generate_listening_practice
    #[serde(default = "default_listen_base_url")]
    pub base_url: String,

    /// Environment variable holding the X-API-Key value
    #[serde(default = "default_listen_api_key_env")]
    pub api_key_env: String,

    /// Where generated audio is written (defaults to the current directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Filename used when the response carries none
    #[serde(default = "default_practice_filename")]
    pub default_filename: String,
}

/// Report builder backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Base URL including the /report prefix
    #[serde(default = "default_report_base_url")]
    pub base_url: String,

    /// `limit` sent to list endpoints
    #[serde(default = "default_report_page_size")]
    pub page_size: u32,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for lexreport data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            base_url: default_listen_base_url(),
            api_key_env: default_listen_api_key_env(),
            output_dir: None,
            default_filename: default_practice_filename(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            base_url: default_report_base_url(),
            page_size: default_report_page_size(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Get the default base directory for lexreport (~/.lexreport)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lexreport")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Get the word-list API key from the environment
    pub fn listen_api_key(&self) -> Option<String> {
        std::env::var(&self.listen.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Directory generated audio lands in
    pub fn output_dir(&self) -> PathBuf {
        self.listen
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("listen.base_url", &self.listen.base_url),
            ("report.base_url", &self.report.base_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| Error::Config(format!("{} is not a valid URL: {}", key, e)))?;
            if url.cannot_be_a_base() {
                return Err(Error::Config(format!("{} must be an http(s) URL", key)));
            }
        }

        if self.report.page_size == 0 {
            return Err(Error::Config("report.page_size must be positive".to_string()));
        }

        if self.listen.default_filename.trim().is_empty() {
            return Err(Error::Config(
                "listen.default_filename must not be empty".to_string(),
            ));
        }

        if self.listen.api_key_env.trim().is_empty() {
            return Err(Error::Config(
                "listen.api_key_env must name an environment variable".to_string(),
            ));
        }

        Ok(())
    }
}
