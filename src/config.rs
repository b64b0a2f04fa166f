use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const MODEL: &str = "gpt-4o-mini";

const PROJECT_SECRETS_FILE: &str = ".secrets.toml";
const APP_DIR: &str = "gpt-chat";

/// Startup failures. Any of these stops the process before a session opens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key found. Please set OPENAI_API_KEY in the secrets file or the environment (.env).")]
    MissingCredential,

    #[error("Failed to read secrets file {}: {source}", .path.display())]
    SecretsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file {}: {source}", .path.display())]
    SecretsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid OPENAI_BASE_URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Contents of the managed secrets file.
#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "OPENAI_API_KEY")]
    api_key: Option<String>,
}

/// Everything the completion client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub base_url: Url,
}

impl Settings {
    /// Resolve settings from the secrets file and the process environment.
    ///
    /// The secrets file wins over `OPENAI_API_KEY` in the environment. With
    /// no explicit path, `./.secrets.toml` and then the per-user config
    /// directory are tried.
    pub fn load(secrets_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match secrets_path {
            Some(path) => Some(path.to_path_buf()),
            None => discover_secrets_file(),
        };
        Self::resolve(path.as_deref(), |key| env::var(key).ok())
    }

    /// Same as [`Settings::load`] with the file already chosen and the
    /// environment supplied by `lookup`.
    pub fn resolve<F>(secrets_path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets = match secrets_path {
            Some(path) => read_secrets(path)?,
            None => SecretsFile::default(),
        };

        // A blank key in the secrets file falls back to the environment
        // instead of failing outright.
        let api_key = non_blank(secrets.api_key)
            .or_else(|| non_blank(lookup(API_KEY_VAR)))
            .ok_or(ConfigError::MissingCredential)?;

        let raw_base = non_blank(lookup(BASE_URL_VAR)).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_base).map_err(|source| ConfigError::InvalidBaseUrl {
            value: raw_base.clone(),
            source,
        })?;

        Ok(Self {
            api_key,
            model: MODEL.to_string(),
            base_url,
        })
    }
}

fn discover_secrets_file() -> Option<PathBuf> {
    let project = PathBuf::from(PROJECT_SECRETS_FILE);
    if project.exists() {
        return Some(project);
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join("secrets.toml"))
        .filter(|path| path.exists())
}

fn read_secrets(path: &Path) -> Result<SecretsFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::SecretsRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&text).map_err(|source| ConfigError::SecretsParse {
        path: path.to_path_buf(),
        source,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn secrets_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_everywhere_is_fatal() {
        let err = Settings::resolve(None, env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));
    }

    #[test]
    fn secrets_file_without_key_falls_through_to_missing() {
        let file = secrets_file("OTHER = \"x\"\n");
        let err = Settings::resolve(Some(file.path()), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let file = secrets_file("OPENAI_API_KEY = \"  \"\n");
        let err = Settings::resolve(Some(file.path()), env_of(&[(API_KEY_VAR, "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));
    }

    #[test]
    fn blank_secrets_key_falls_back_to_environment() {
        let file = secrets_file("OPENAI_API_KEY = \"\"\n");
        let settings =
            Settings::resolve(Some(file.path()), env_of(&[(API_KEY_VAR, "sk-env")])).unwrap();
        assert_eq!(settings.api_key, "sk-env");
    }

    #[test]
    fn environment_is_the_fallback() {
        let settings = Settings::resolve(None, env_of(&[(API_KEY_VAR, "sk-env")])).unwrap();
        assert_eq!(settings.api_key, "sk-env");
        assert_eq!(settings.model, MODEL);
        assert_eq!(settings.base_url.as_str(), "https://api.openai.com/v1");
    }

    #[test]
    fn secrets_file_takes_precedence() {
        let file = secrets_file("OPENAI_API_KEY = \"sk-file\"\n");
        let settings =
            Settings::resolve(Some(file.path()), env_of(&[(API_KEY_VAR, "sk-env")])).unwrap();
        assert_eq!(settings.api_key, "sk-file");
    }

    #[test]
    fn malformed_secrets_file_is_reported() {
        let file = secrets_file("OPENAI_API_KEY = \n");
        let err = Settings::resolve(Some(file.path()), env_of(&[(API_KEY_VAR, "sk-env")])).unwrap_err();
        assert!(matches!(err, ConfigError::SecretsParse { .. }));
    }

    #[test]
    fn unreadable_secrets_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Settings::resolve(Some(&missing), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::SecretsRead { .. }));
    }

    #[test]
    fn base_url_override_is_validated() {
        let settings = Settings::resolve(
            None,
            env_of(&[(API_KEY_VAR, "sk"), (BASE_URL_VAR, "http://localhost:8080/v1")]),
        )
        .unwrap();
        assert_eq!(settings.base_url.as_str(), "http://localhost:8080/v1");

        let err = Settings::resolve(None, env_of(&[(API_KEY_VAR, "sk"), (BASE_URL_VAR, "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}
