use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::errors::ConfigError;
use crate::serde_utils::from_json_str;

/// Public ClawIQ API endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.clawiq.md";

const API_KEY_ENV: &str = "CLAWIQ_API_KEY";
const ENDPOINT_ENV: &str = "CLAWIQ_ENDPOINT";

/// Shape of `~/.clawiq/config.json`. Only the fields the query tooling reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    #[serde(default)]
    api_key: Option<String>,
}

/// Connection settings for the remote telemetry service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Loads configuration from `.env`, the process environment and the
    /// user's config file.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let stored = config_file_path().and_then(|path| read_stored_config(&path));
        Self::resolve(
            stored.as_deref(),
            read_env(API_KEY_ENV)?,
            read_env(ENDPOINT_ENV)?,
        )
    }

    /// Builds the configuration from already-read sources. Environment values
    /// take precedence over the config file.
    pub fn resolve(
        file_contents: Option<&str>,
        api_key_env: Option<String>,
        endpoint_env: Option<String>,
    ) -> Result<Self, ConfigError> {
        let stored = file_contents
            .and_then(|raw| match from_json_str::<StoredConfig>(raw) {
                Ok(stored) => Some(stored),
                Err(err) => {
                    warn!(error = %err, "ignoring unreadable config file");
                    None
                }
            })
            .unwrap_or_default();

        let api_key = api_key_env
            .or(stored.api_key)
            .filter(|key| !key.trim().is_empty());

        let endpoint = parse_endpoint(endpoint_env.as_deref().unwrap_or(DEFAULT_ENDPOINT))?;

        Ok(Self { endpoint, api_key })
    }

    /// Replaces the endpoint, e.g. from a command-line flag.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    /// Returns the API key to use, preferring an explicit flag value.
    pub fn require_api_key(&self, flag: Option<&str>) -> Result<String, ConfigError> {
        flag.filter(|key| !key.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.api_key.clone())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// Location of the user's config file, when a home directory is known.
pub fn config_file_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".clawiq");
    path.push("config.json");
    Some(path)
}

fn read_stored_config(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no config file loaded");
            None
        }
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(ConfigError::InvalidEnvVar { key, source: err }),
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|source| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        source,
    })
}
