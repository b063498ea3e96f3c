use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables that select an explicit backend base URL, in
/// precedence order. The last two are the names the SochGPT web UI reads,
/// so an existing deployment's setting is picked up as is.
pub const API_BASE_VARS: [&str; 3] = ["SOCH_API_BASE", "REACT_APP_API_BASE", "VITE_API_BASE"];

/// Origin used for relative requests when nothing else is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Path of the chat route on the backend
pub const CHAT_PATH: &str = "/chat";

/// Path of the health route on the backend
pub const HEALTH_PATH: &str = "/healthz";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin that relative requests resolve against
    pub origin: String,

    /// Backend base URL from the config file (environment takes precedence)
    pub api_base: Option<String>,

    /// Where the interactive session writes its log
    pub log_file: Option<PathBuf>,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            origin: DEFAULT_ORIGIN.to_string(),
            api_base: None,
            log_file: None,
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_timestamps: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// `<config_dir>/soch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("soch").join("config.toml"))
    }

    /// Log file for the interactive session
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("soch")
                .join("soch.log")
        })
    }

    /// Resolve the backend endpoint from the process environment.
    ///
    /// Called once at startup; the result is handed to the query client.
    pub fn endpoint(&self) -> ApiEndpoint {
        ApiEndpoint::resolve(|name| std::env::var(name).ok(), self)
    }
}

/// Where chat requests go: either `<base>/chat` or `/chat` relative to the
/// session origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base: Option<String>,
    origin: String,
}

impl ApiEndpoint {
    /// Resolve the endpoint with `lookup` standing in for the environment.
    ///
    /// Empty values count as unset.
    pub fn resolve<F>(lookup: F, config: &Config) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = API_BASE_VARS
            .into_iter()
            .filter_map(|name| lookup(name))
            .chain(config.api_base.clone())
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .find(|value| !value.is_empty());

        Self {
            base,
            origin: config.origin.clone(),
        }
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Request target for `path`, as the wire contract names it
    pub fn target(&self, path: &str) -> String {
        match &self.base {
            Some(base) => format!("{}{}", base, path),
            None => path.to_string(),
        }
    }

    /// Absolute URL for `path`; relative targets resolve against the origin
    pub fn url(&self, path: &str) -> Result<Url> {
        match &self.base {
            Some(_) => {
                let target = self.target(path);
                Url::parse(&target).with_context(|| format!("Invalid backend URL {}", target))
            }
            None => Url::parse(&self.origin)
                .and_then(|origin| origin.join(path))
                .with_context(|| format!("Invalid origin {}", self.origin)),
        }
    }

    /// Short label for the UI header
    pub fn chat_target(&self) -> String {
        self.target(CHAT_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn no_base_configured_uses_relative_chat_path() {
        let endpoint = ApiEndpoint::resolve(lookup(&[]), &Config::default());
        assert_eq!(endpoint.base(), None);
        assert_eq!(endpoint.chat_target(), "/chat");
        assert_eq!(
            endpoint.url(CHAT_PATH).unwrap().as_str(),
            "http://localhost:8000/chat"
        );
    }

    #[test]
    fn configured_base_prefixes_chat_path() {
        let endpoint = ApiEndpoint::resolve(
            lookup(&[("SOCH_API_BASE", "http://10.0.0.5:9000")]),
            &Config::default(),
        );
        assert_eq!(endpoint.chat_target(), "http://10.0.0.5:9000/chat");
    }

    #[test]
    fn first_variable_wins_over_second() {
        let endpoint = ApiEndpoint::resolve(
            lookup(&[
                ("REACT_APP_API_BASE", "http://react"),
                ("VITE_API_BASE", "http://vite"),
            ]),
            &Config::default(),
        );
        assert_eq!(endpoint.base(), Some("http://react"));

        let endpoint =
            ApiEndpoint::resolve(lookup(&[("VITE_API_BASE", "http://vite")]), &Config::default());
        assert_eq!(endpoint.base(), Some("http://vite"));
    }

    #[test]
    fn soch_alias_takes_precedence_over_web_ui_names() {
        let endpoint = ApiEndpoint::resolve(
            lookup(&[
                ("SOCH_API_BASE", "http://soch"),
                ("REACT_APP_API_BASE", "http://react"),
                ("VITE_API_BASE", "http://vite"),
            ]),
            &Config::default(),
        );
        assert_eq!(endpoint.base(), Some("http://soch"));
    }

    #[test]
    fn empty_variable_falls_through() {
        let endpoint = ApiEndpoint::resolve(
            lookup(&[
                ("SOCH_API_BASE", ""),
                ("REACT_APP_API_BASE", "  "),
                ("VITE_API_BASE", "http://b"),
            ]),
            &Config::default(),
        );
        assert_eq!(endpoint.base(), Some("http://b"));
    }

    #[test]
    fn environment_overrides_config_file() {
        let config = Config {
            api_base: Some("http://from-file".to_string()),
            ..Config::default()
        };
        let endpoint = ApiEndpoint::resolve(lookup(&[("VITE_API_BASE", "http://env")]), &config);
        assert_eq!(endpoint.base(), Some("http://env"));

        let endpoint = ApiEndpoint::resolve(lookup(&[]), &config);
        assert_eq!(endpoint.base(), Some("http://from-file"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let endpoint = ApiEndpoint::resolve(
            lookup(&[("SOCH_API_BASE", "http://host:8000/")]),
            &Config::default(),
        );
        assert_eq!(endpoint.chat_target(), "http://host:8000/chat");
    }

    #[test]
    fn relative_target_resolves_against_custom_origin() {
        let config = Config {
            origin: "http://127.0.0.1:3000".to_string(),
            ..Config::default()
        };
        let endpoint = ApiEndpoint::resolve(lookup(&[]), &config);
        assert_eq!(
            endpoint.url(HEALTH_PATH).unwrap().as_str(),
            "http://127.0.0.1:3000/healthz"
        );
    }

    #[test]
    fn invalid_origin_is_an_error() {
        let config = Config {
            origin: "not a url".to_string(),
            ..Config::default()
        };
        let endpoint = ApiEndpoint::resolve(lookup(&[]), &config);
        assert!(endpoint.url(CHAT_PATH).is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert!(config.ui.show_timestamps);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base = \"http://lab:8000\"\n\n[ui]\nshow_timestamps = false\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_base.as_deref(), Some("http://lab:8000"));
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert!(!config.ui.show_timestamps);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "origin = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
