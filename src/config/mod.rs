use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded once at startup and passed by reference to
/// the transport client. Deeper call sites never read the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Base URL of the CVRGPT backend.
    #[serde(default = "default_base_url")]
    pub api_base_url: String,

    /// API key sent as `x-api-key` on every request.
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            api_base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load `~/.cvrchat/config.toml`, creating a default file on first run.
    /// Environment overrides are applied after the file is read.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let cvrchat_dir = home.join(".cvrchat");
        let config_path = cvrchat_dir.join("config.toml");

        if !cvrchat_dir.exists() {
            fs::create_dir_all(&cvrchat_dir)?;
        }

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(format!("failed to parse config file: {e}")))?;
            config.config_path.clone_from(&config_path);
            config
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the loaded config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var("CVRCHAT_API_BASE_URL") {
            if !base.trim().is_empty() {
                self.api_base_url = base;
            }
        }
        if let Ok(key) = std::env::var("CVRCHAT_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(timeout) = std::env::var("CVRCHAT_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.timeout_secs = secs;
            }
        }
    }

    /// Reject configs the transport client could not use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.api_base_url).map_err(|e| {
            ConfigError::Validation(format!("api_base_url {:?}: {e}", self.api_base_url))
        })?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}
