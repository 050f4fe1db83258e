//! Client configuration.
//!
//! Loaded from `~/.bookstore/config.toml` (or an explicit path). Every field
//! has a default, so a missing file is not an error. Environment variables
//! override the file; CLI flags override both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the user's home holding config and session state.
pub const APP_DIR_NAME: &str = ".bookstore";

pub const ENV_CONFIG_PATH: &str = "BOOKSTORE_CONFIG";
pub const ENV_API_URL: &str = "BOOKSTORE_API_URL";
pub const ENV_DATA_DIR: &str = "BOOKSTORE_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, e.g. `http://localhost:5000`.
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// Where the session file lives. `~` is expanded.
    pub data_dir: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            request_timeout_secs: crate::api::client::DEFAULT_TIMEOUT_SECS,
            data_dir: format!("~/{APP_DIR_NAME}"),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields defaults; an unparsable one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Effective config for a run: file, then environment, then the
    /// `--api-url` flag, validated last.
    pub fn resolve(path: Option<&Path>, api_url_flag: Option<&str>) -> Result<Self> {
        Self::resolve_from(path, api_url_flag, |key| std::env::var(key).ok())
    }

    fn resolve_from(
        path: Option<&Path>,
        api_url_flag: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides_from(lookup);
        if let Some(url) = api_url_flag.filter(|url| !url.trim().is_empty()) {
            config.api_url = url.to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// `BOOKSTORE_API_URL` / `BOOKSTORE_DATA_DIR`; blank values are unset.
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(dir) = non_empty(ENV_DATA_DIR) {
            self.data_dir = dir;
        }
    }

    /// `data_dir` with `~` and `$VARS` expanded.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match shellexpand::full(&self.data_dir) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                tracing::debug!("Could not expand data_dir ({e}), using it verbatim");
                PathBuf::from(&self.data_dir)
            }
        }
    }
}

/// `$BOOKSTORE_CONFIG`, else `~/.bookstore/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(APP_DIR_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(Some(tmp.path().join("nope.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "api_url = \"https://books.example.com\"\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.api_url, "https://books.example.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        std::fs::write(&path, "api_url = [").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());

        std::fs::write(&path, "api_url = \"ftp://x\"").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());

        std::fs::write(&path, "request_timeout_secs = 0").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn env_overrides_win_and_ignore_blanks() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "http://10.0.0.5:8080"),
            (ENV_DATA_DIR, "   "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_url, "http://10.0.0.5:8080");
        assert_eq!(config.data_dir, Config::default().data_dir);
    }

    #[test]
    fn resolve_applies_file_then_env_then_flag() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"http://from-file:5000\"\ndata_dir = \"/from/file\"\nlog_level = \"info\"\n",
        )
        .unwrap();

        let no_env = |_: &str| None;
        let config = Config::resolve_from(Some(path.as_path()), None, no_env).unwrap();
        assert_eq!(config.api_url, "http://from-file:5000");
        assert_eq!(config.data_dir, "/from/file");

        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "http://from-env:5000"),
            (ENV_DATA_DIR, "/from/env"),
        ]
        .into_iter()
        .collect();
        let env = |key: &str| vars.get(key).map(|v| v.to_string());

        let config = Config::resolve_from(Some(path.as_path()), None, env).unwrap();
        assert_eq!(config.api_url, "http://from-env:5000");
        assert_eq!(config.data_dir, "/from/env");
        assert_eq!(config.log_level, "info");

        let config =
            Config::resolve_from(Some(path.as_path()), Some("https://from-flag"), env).unwrap();
        assert_eq!(config.api_url, "https://from-flag");
        assert_eq!(config.data_dir, "/from/env");
    }

    #[test]
    fn resolve_validates_the_flag_value() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("none.toml");
        let err = Config::resolve_from(Some(missing.as_path()), Some("localhost:5000"), |_| None)
            .unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn data_dir_plain_path_is_unchanged() {
        let config = Config {
            data_dir: "/var/lib/bookstore".into(),
            ..Config::default()
        };
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/var/lib/bookstore"));
    }
}
