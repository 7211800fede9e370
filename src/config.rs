//! Configuration management for medportal using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::SESSION_FILENAME;
use crate::upload::transport::{TransportConfig, DEFAULT_ENDPOINT};

/// Default documents subdirectory name.
const DOCUMENTS_SUBDIR: &str = "documents";

/// Application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base data directory (session cache, stored documents).
    pub data_dir: PathBuf,
    /// Directory for the local document store.
    pub documents_dir: PathBuf,
    /// Full URL of the report analysis endpoint.
    pub analysis_endpoint: String,
    /// Bearer token for the analysis service.
    pub api_token: Option<String>,
    /// Request timeout in seconds. None leaves requests unbounded.
    pub request_timeout: Option<u64>,
    /// User agent for HTTP requests.
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medportal");

        Self {
            documents_dir: data_dir.join(DOCUMENTS_SUBDIR),
            data_dir,
            analysis_endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            request_timeout: None,
            user_agent: format!("medportal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            documents_dir: data_dir.join(DOCUMENTS_SUBDIR),
            data_dir,
            ..Default::default()
        }
    }

    /// Path of the cached session file.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILENAME)
    }

    /// Transport configuration for the analysis service.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            endpoint: self.analysis_endpoint.clone(),
            api_token: self.api_token.clone(),
            timeout: self.request_timeout.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Supported variables:
    /// - `MEDPORTAL_ENDPOINT`: analysis endpoint URL
    /// - `MEDPORTAL_API_TOKEN`: bearer token for the analysis service
    /// - `MEDPORTAL_REQUEST_TIMEOUT`: timeout in seconds (0 disables)
    /// - `MEDPORTAL_DATA_DIR`: data directory
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get("MEDPORTAL_ENDPOINT") {
            tracing::debug!("Using MEDPORTAL_ENDPOINT from environment: {}", endpoint);
            self.analysis_endpoint = endpoint;
        }
        if let Some(token) = get("MEDPORTAL_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(timeout) = get("MEDPORTAL_REQUEST_TIMEOUT") {
            match timeout.trim().parse::<u64>() {
                Ok(0) => self.request_timeout = None,
                Ok(secs) => self.request_timeout = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid MEDPORTAL_REQUEST_TIMEOUT: {}", timeout),
            }
        }
        if let Some(dir) = get("MEDPORTAL_DATA_DIR") {
            let expanded = shellexpand::tilde(&dir).into_owned();
            self.data_dir = PathBuf::from(expanded);
            self.documents_dir = self.data_dir.join(DOCUMENTS_SUBDIR);
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Analysis endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "endpoint")]
    pub analysis_endpoint: Option<String>,
    /// Bearer token for the analysis service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers medportal config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("medportal").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.documents_dir = settings.data_dir.join(DOCUMENTS_SUBDIR);
        }
        if let Some(ref endpoint) = self.analysis_endpoint {
            settings.analysis_endpoint = endpoint.clone();
        }
        if let Some(ref token) = self.api_token {
            settings.api_token = Some(token.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = (timeout > 0).then_some(timeout);
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory (--data-dir flag).
    pub data_dir: Option<PathBuf>,
}

/// Load settings with explicit options.
///
/// Precedence, lowest to highest: defaults, config file, environment,
/// command-line options.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let mut settings = Settings::default();
    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    config.apply_to_settings(&mut settings, &base_dir);

    settings.apply_env(|key| std::env::var(key).ok());

    if let Some(data_dir) = options.data_dir {
        settings.documents_dir = data_dir.join(DOCUMENTS_SUBDIR);
        settings.data_dir = data_dir;
    }

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.analysis_endpoint, "http://localhost:8000/analyze-report");
        assert!(settings.request_timeout.is_none());
        assert!(settings.data_dir.ends_with("medportal"));
        assert_eq!(settings.session_path(), settings.data_dir.join("session.json"));

        let transport = settings.transport_config();
        assert!(transport.timeout.is_none());
    }

    #[test]
    fn test_parse_formats() {
        let toml = Config::parse(
            "analysis_endpoint = \"https://ai.example.org/analyze-report\"\nrequest_timeout = 30\n",
            Path::new("medportal.toml"),
        )
        .unwrap();
        assert_eq!(
            toml.analysis_endpoint.as_deref(),
            Some("https://ai.example.org/analyze-report")
        );
        assert_eq!(toml.request_timeout, Some(30));

        let yaml = Config::parse(
            "endpoint: http://10.0.0.5:8000/analyze-report\n",
            Path::new("c.yml"),
        )
        .unwrap();
        assert_eq!(
            yaml.analysis_endpoint.as_deref(),
            Some("http://10.0.0.5:8000/analyze-report")
        );

        let json = Config::parse(r#"{"data_dir": "./data"}"#, Path::new("c.json")).unwrap();
        assert_eq!(json.data_dir.as_deref(), Some("./data"));

        assert!(Config::parse("not = [valid", Path::new("c.toml")).is_err());
    }

    #[tokio::test]
    async fn test_load_from_path_and_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medportal.toml");
        std::fs::write(
            &path,
            "data_dir = \"state\"\napi_token = \"abc\"\nrequest_timeout = 0\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));

        let mut settings = Settings::default();
        settings.request_timeout = Some(5);
        config.apply_to_settings(&mut settings, &config.base_dir().unwrap());

        assert_eq!(settings.data_dir, dir.path().join("state"));
        assert_eq!(settings.documents_dir, dir.path().join("state").join("documents"));
        assert_eq!(settings.api_token.as_deref(), Some("abc"));
        assert_eq!(settings.request_timeout, None);
    }

    #[tokio::test]
    async fn test_load_from_missing_path() {
        let err = Config::load_from_path(Path::new("/nonexistent/medportal.toml"))
            .await
            .unwrap_err();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MEDPORTAL_ENDPOINT", "http://analysis:9000/analyze-report"),
            ("MEDPORTAL_API_TOKEN", "tok"),
            ("MEDPORTAL_REQUEST_TIMEOUT", "45"),
            ("MEDPORTAL_DATA_DIR", "/srv/medportal"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.analysis_endpoint, "http://analysis:9000/analyze-report");
        assert_eq!(settings.api_token.as_deref(), Some("tok"));
        assert_eq!(settings.request_timeout, Some(45));
        assert_eq!(settings.data_dir, PathBuf::from("/srv/medportal"));
        assert_eq!(settings.documents_dir, PathBuf::from("/srv/medportal/documents"));
        assert_eq!(
            settings.transport_config().timeout,
            Some(Duration::from_secs(45))
        );
    }

    #[test]
    fn test_env_invalid_and_empty_values_ignored() {
        let env: HashMap<&str, &str> = [
            ("MEDPORTAL_ENDPOINT", "  "),
            ("MEDPORTAL_REQUEST_TIMEOUT", "soon"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.request_timeout = Some(10);
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.analysis_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.request_timeout, Some(10));
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/etc/medportal");
        assert_eq!(config.resolve_path("/abs/dir", base), PathBuf::from("/abs/dir"));
        assert_eq!(config.resolve_path("rel", base), PathBuf::from("/etc/medportal/rel"));
    }
}
