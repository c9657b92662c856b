use crate::shared::paths::{ensure_dir, get_storage_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const LOCAL_API_URL: &str = "http://localhost:8000";
const DOCKER_API_URL: &str = "http://backend:8000";
const DEFAULT_FETCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Catalog API origin, e.g. `http://localhost:8000`. The `/api/...` paths are appended.
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Upper bound on concurrent per-category tag fetches during load.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Per-request timeout. Unset means requests may wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            request_timeout_secs: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Values from the command line that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub fetch_concurrency: usize,
}

impl AppSettings {
    /// Merge file settings, environment and command line into a client config.
    ///
    /// Precedence for the base URL: command line, `CATALOG_ADMIN_API_URL`,
    /// settings file, then `http://backend:8000` when `DOCKER=true` or
    /// `http://localhost:8000` otherwise.
    pub fn resolve(&self, overrides: &SettingsOverrides) -> Result<ClientConfig, SettingsError> {
        let env_url = std::env::var("CATALOG_ADMIN_API_URL").ok();
        let docker = std::env::var("DOCKER").map(|v| v == "true").unwrap_or(false);
        self.resolve_with(overrides, env_url.as_deref(), docker)
    }

    fn resolve_with(
        &self,
        overrides: &SettingsOverrides,
        env_url: Option<&str>,
        docker: bool,
    ) -> Result<ClientConfig, SettingsError> {
        let base_url = overrides
            .api_url
            .as_deref()
            .or(env_url)
            .or(self.api_base_url.as_deref())
            .unwrap_or(if docker { DOCKER_API_URL } else { LOCAL_API_URL });

        let base_url = normalize_base_url(base_url)?;
        let timeout = overrides
            .timeout_secs
            .or(self.request_timeout_secs)
            .map(Duration::from_secs);

        Ok(ClientConfig {
            base_url,
            timeout,
            fetch_concurrency: self.fetch_concurrency.max(1),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(SettingsError::InvalidUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn get_settings_path() -> PathBuf {
    get_storage_dir().join("settings.json")
}

/// Load settings, falling back to defaults when the file is missing or broken.
pub fn load_settings() -> AppSettings {
    let path = get_settings_path();

    if !path.exists() {
        return AppSettings::default();
    }

    match load_settings_from_file(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(target: "system", "Ignoring settings at {:?}: {}", path, e);
            AppSettings::default()
        }
    }
}

pub fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings(settings: &AppSettings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = AppSettings::default()
            .resolve_with(&SettingsOverrides::default(), None, false)
            .unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, None);
        assert_eq!(config.fetch_concurrency, 4);
    }

    #[test]
    fn test_docker_switches_default_host() {
        let config = AppSettings::default()
            .resolve_with(&SettingsOverrides::default(), None, true)
            .unwrap();
        assert_eq!(config.base_url, "http://backend:8000");
    }

    #[test]
    fn test_precedence_cli_env_file() {
        let settings = AppSettings {
            api_base_url: Some("http://file:1".to_string()),
            fetch_concurrency: 0,
            request_timeout_secs: Some(10),
        };

        let from_file = settings
            .resolve_with(&SettingsOverrides::default(), None, true)
            .unwrap();
        assert_eq!(from_file.base_url, "http://file:1");
        assert_eq!(from_file.timeout, Some(Duration::from_secs(10)));
        assert_eq!(from_file.fetch_concurrency, 1);

        let from_env = settings
            .resolve_with(&SettingsOverrides::default(), Some("http://env:2/"), false)
            .unwrap();
        assert_eq!(from_env.base_url, "http://env:2");

        let overrides = SettingsOverrides {
            api_url: Some("https://cli:3".to_string()),
            timeout_secs: Some(1),
        };
        let from_cli = settings
            .resolve_with(&overrides, Some("http://env:2"), false)
            .unwrap();
        assert_eq!(from_cli.base_url, "https://cli:3");
        assert_eq!(from_cli.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let overrides = SettingsOverrides {
            api_url: Some("localhost:8000".to_string()),
            timeout_secs: None,
        };
        let err = AppSettings::default()
            .resolve_with(&overrides, None, false)
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidUrl(_)));
    }

    #[test]
    fn test_save_then_load_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("settings.json");

        let settings = AppSettings {
            api_base_url: Some("http://shop.local".to_string()),
            ..AppSettings::default()
        };
        save_settings(&settings, &path).unwrap();
        assert_eq!(load_settings_from_file(&path).unwrap(), settings);

        std::fs::write(&path, r#"{"requestTimeoutSecs": 5}"#).unwrap();
        let partial = load_settings_from_file(&path).unwrap();
        assert_eq!(partial.fetch_concurrency, 4);
        assert_eq!(partial.request_timeout_secs, Some(5));
        assert_eq!(partial.api_base_url, None);
    }
}
