//! Service endpoint configuration.
//!
//! Settings come from an optional TOML file with kebab-case keys. Missing
//! values fall back to the public GitHub and Codeberg endpoints, and the API
//! URLs can be overridden through environment variables.

mod error;

pub use error::ConfigError;

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Overrides the source service API URL.
pub const SOURCE_API_URL_ENV: &str = "ISSUE_MIGRATOR_SOURCE_API_URL";

/// Overrides the target service API URL.
pub const TARGET_API_URL_ENV: &str = "ISSUE_MIGRATOR_TARGET_API_URL";

const DEFAULT_SOURCE_NAME: &str = "GitHub";
const DEFAULT_SOURCE_API_URL: &str = "https://api.github.com";
const DEFAULT_TARGET_NAME: &str = "Codeberg";
const DEFAULT_TARGET_API_URL: &str = "https://codeberg.org/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Display name and API location of one issue tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Human readable service name used in provenance text and messages.
    pub name: String,

    /// Base URL of the REST API.
    pub api_url: String,
}

/// Resolved configuration for a migration session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    /// The service issues are migrated away from.
    pub source: ServiceConfig,

    /// The service issues are migrated to.
    pub target: ServiceConfig,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// On-disk layout of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    source: ServiceSection,
    #[serde(default)]
    target: ServiceSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ServiceSection {
    name: Option<String>,
    api_url: Option<String>,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            source: ServiceConfig {
                name: DEFAULT_SOURCE_NAME.to_string(),
                api_url: DEFAULT_SOURCE_API_URL.to_string(),
            },
            target: ServiceConfig {
                name: DEFAULT_TARGET_NAME.to_string(),
                api_url: DEFAULT_TARGET_API_URL.to_string(),
            },
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl MigratorConfig {
    /// Loads configuration from a TOML file, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, malformed,
    /// or if any resolved setting fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        info!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::TomlError {
            path: path.display().to_string(),
            source,
        })?;

        Self::resolve(file)
    }

    /// Loads the config file when a path is given, otherwise uses defaults.
    ///
    /// Environment overrides apply in both cases.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] under the same conditions as [`Self::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file given, using defaults");
                Self::resolve(ConfigFile::default())
            }
        }
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn resolve(file: ConfigFile) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(timeout) = file.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
        apply_section(&mut config.source, file.source);
        apply_section(&mut config.target, file.target);

        if let Ok(url) = std::env::var(SOURCE_API_URL_ENV) {
            debug!(env = SOURCE_API_URL_ENV, "Overriding source API URL");
            config.source.api_url = url;
        }
        if let Ok(url) = std::env::var(TARGET_API_URL_ENV) {
            debug!(env = TARGET_API_URL_ENV, "Overriding target API URL");
            config.target.api_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                setting: "request-timeout-secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        validate_service("source", &self.source)?;
        validate_service("target", &self.target)
    }
}

fn apply_section(service: &mut ServiceConfig, section: ServiceSection) {
    if let Some(name) = section.name {
        service.name = name;
    }
    if let Some(api_url) = section.api_url {
        service.api_url = api_url;
    }
}

fn validate_service(section: &str, service: &ServiceConfig) -> Result<(), ConfigError> {
    if service.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            setting: format!("{section}.name"),
            message: "must not be empty".to_string(),
        });
    }

    match Url::parse(&service.api_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::ValidationError {
            setting: format!("{section}.api-url"),
            message: format!("not a valid http(s) URL: {}", service.api_url),
        }),
    }
}
