use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "config.json";

fn default_api_base() -> String {
    "https://api.crowdin.com/api/v2".to_string()
}

fn default_authorize_url() -> String {
    "https://accounts.crowdin.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://accounts.crowdin.com/oauth/token".to_string()
}

fn default_client_id() -> String {
    "poedit-y1U2KrZf2lTqNGJU".to_string()
}

fn default_redirect_uri() -> String {
    "poedit://auth/crowdin/".to_string()
}

fn default_scope() -> String {
    "project".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CrowdinConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Only needed for the authorization-code exchange.
    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CrowdinConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            client_id: default_client_id(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogMode {
    #[default]
    Stderr,
    File,
    Off,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default)]
    pub mode: LogMode,

    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            mode: LogMode::default(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub crowdin: CrowdinConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Where downloaded Crowdin files land; empty means the temp dir.
    #[serde(default)]
    pub download_dir: String,

    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Reads `$LINGO_CONFIG`, or `config.json` in the data dir, then applies
    /// environment overrides. A missing file means defaults.
    pub fn load() -> Result<AppConfig, ConfigError> {
        let data_dir = data_dir();
        let path = std::env::var("LINGO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join(CONFIG_FILE_NAME));

        let mut config = Self::from_file(&path)?;
        config.data_dir = data_dir;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }

        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Ok(api) = std::env::var("LINGO_CROWDIN_API_BASE") {
            if !api.trim().is_empty() {
                self.crowdin.api_base = api.trim().to_string();
            }
        }
        if let Ok(level) = std::env::var("LINGO_LOG") {
            if !level.trim().is_empty() {
                self.log.level = level.trim().to_string();
            }
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        if self.download_dir.trim().is_empty() {
            std::env::temp_dir().join("lingo-crowdin")
        } else {
            PathBuf::from(self.download_dir.trim())
        }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("crowdin_token.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LINGO_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Some(local) = dirs::data_local_dir() {
        return local.join("Lingo");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("Lingo")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.crowdin.redirect_uri, "poedit://auth/crowdin/");
        assert_eq!(config.log.mode, LogMode::Stderr);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"crowdin": {"client_secret": "s3cret"}, "log": {"mode": "off"}}"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.crowdin.client_secret, "s3cret");
        assert_eq!(config.crowdin.api_base, "https://api.crowdin.com/api/v2");
        assert_eq!(config.log.mode, LogMode::Off);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_download_dir_means_temp() {
        let config = AppConfig::default();
        assert!(config.download_dir().starts_with(std::env::temp_dir()));
    }
}
