//! hubscale.toml configuration parser.
//!
//! Secrets never live in the file itself: the file names the environment
//! variables that carry them, and the accessors resolve those at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Watch-loop interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(600);

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubscaleConfig {
    pub hub: HubConfig,
    pub auth: AuthConfig,
    pub scale_up: JobConfig,
    pub scale_down: JobConfig,
    pub notify: Option<NotifyConfig>,
}

/// The managed hub resource being scaled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

/// Service-principal credentials for the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub tenant_id: String,
    pub client_id: String,
    /// Name of the environment variable holding the client secret.
    pub client_secret_env: String,
    /// Identity endpoint; defaults to the public cloud.
    pub authority_url: Option<String>,
    /// Resource-management endpoint; defaults to the public cloud.
    pub management_url: Option<String>,
}

impl AuthConfig {
    /// Resolve the client secret from the configured environment variable.
    pub fn client_secret(&self) -> Result<String, ConfigError> {
        std::env::var(&self.client_secret_env)
            .map_err(|_| ConfigError::MissingEnv(self.client_secret_env.clone()))
    }
}

/// Per-direction job parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Percentage of the tier's capacity that arms the trigger (0-100).
    pub threshold_percent: u8,
    /// Evaluation interval for the watch loop (e.g. "10m"). Only the
    /// scale-up job runs on a loop.
    pub interval: Option<String>,
}

impl JobConfig {
    /// The configured interval, falling back to [`DEFAULT_INTERVAL`].
    pub fn interval(&self) -> Duration {
        self.interval
            .as_deref()
            .and_then(parse_interval)
            .unwrap_or(DEFAULT_INTERVAL)
    }
}

/// Email notification settings. Omitting the section disables email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Name of the environment variable holding the mail API key.
    pub api_key_env: String,
    /// Mail API endpoint override (tests point this at a local server).
    pub endpoint: Option<String>,
    pub from: String,
    pub to: String,
}

impl NotifyConfig {
    /// Resolve the mail API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.api_key_env)
            .map_err(|_| ConfigError::MissingEnv(self.api_key_env.clone()))
    }
}

impl HubscaleConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: HubscaleConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("hub.subscription_id", &self.hub.subscription_id),
            ("hub.resource_group", &self.hub.resource_group),
            ("hub.name", &self.hub.name),
            ("auth.tenant_id", &self.auth.tenant_id),
            ("auth.client_id", &self.auth.client_id),
            ("auth.client_secret_env", &self.auth.client_secret_env),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }

        for (job, config) in [("scale_up", &self.scale_up), ("scale_down", &self.scale_down)] {
            if config.threshold_percent > 100 {
                return Err(ConfigError::Invalid(format!(
                    "{job}.threshold_percent must be between 0 and 100"
                )));
            }
            if let Some(interval) = config.interval.as_deref()
                && parse_interval(interval).is_none()
            {
                return Err(ConfigError::Invalid(format!(
                    "{job}.interval is not a valid duration: {interval}"
                )));
            }
        }

        Ok(())
    }
}

/// Parse a duration string like "30s", "10m", "1h".
fn parse_interval(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else if let Some(hours) = s.strip_suffix('h') {
        hours.parse::<u64>().ok().map(|h| Duration::from_secs(h * 3600))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
