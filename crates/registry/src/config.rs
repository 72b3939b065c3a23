//! Registry configuration with file loading and validation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tollgate_core::{
    Error, Result, ResultExt, DEFAULT_TICKET_ID_RANDOM_LENGTH, TOLLGATE_CONFIG_VAR,
};
use tollgate_ticket::ExpirationPolicyConfig;

/// Ticket id generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdGeneratorConfig {
    /// Length of the random alphanumeric part
    pub random_length: usize,
    /// Appended to every id, typically a node name
    pub suffix: Option<String>,
}

impl Default for IdGeneratorConfig {
    fn default() -> Self {
        Self {
            random_length: DEFAULT_TICKET_ID_RANDOM_LENGTH,
            suffix: None,
        }
    }
}

/// Configuration of a [`TicketRegistry`](crate::TicketRegistry)
///
/// Every field has a default, so a configuration file only names what it
/// changes:
///
/// ```json
/// {
///   "service_ticket_policy": { "type": "multi_use_or_timeout", "max_uses": 1, "time_to_kill_secs": 10 },
///   "id_generator": { "suffix": "node-a" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub service_ticket_policy: ExpirationPolicyConfig,
    pub ticket_granting_ticket_policy: ExpirationPolicyConfig,
    pub proxy_granting_ticket_policy: ExpirationPolicyConfig,
    pub id_generator: IdGeneratorConfig,
    /// Drop a service ticket as soon as a validation leaves it expired
    pub remove_expired_on_validation: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            service_ticket_policy: ExpirationPolicyConfig::service_ticket_default(),
            ticket_granting_ticket_policy: ExpirationPolicyConfig::ticket_granting_ticket_default(),
            proxy_granting_ticket_policy: ExpirationPolicyConfig::ticket_granting_ticket_default(),
            id_generator: IdGeneratorConfig::default(),
            remove_expired_on_validation: true,
        }
    }
}

/// Where a configuration came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Assembled in code
    Builder,
}

impl RegistryConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read", e))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("invalid registry configuration in '{}'", path.display()))
    }

    /// Load from the file named by `TOLLGATE_CONFIG`, or fall back to defaults
    pub fn load() -> Result<(Self, ConfigSource)> {
        match std::env::var_os(TOLLGATE_CONFIG_VAR) {
            Some(path) if !path.is_empty() => {
                let path = PathBuf::from(path);
                let config = Self::from_file(&path)?;
                Ok((config, ConfigSource::ConfigFile(path)))
            }
            _ => Ok((Self::default(), ConfigSource::Default)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.service_ticket_policy
            .validate()
            .context("service_ticket_policy")?;
        self.ticket_granting_ticket_policy
            .validate()
            .context("ticket_granting_ticket_policy")?;
        self.proxy_granting_ticket_policy
            .validate()
            .context("proxy_granting_ticket_policy")?;

        if self.id_generator.random_length == 0 {
            return Err(Error::configuration(
                "id_generator.random_length must be greater than zero",
            ));
        }
        if let Some(suffix) = &self.id_generator.suffix {
            if suffix.is_empty() || suffix.chars().any(char::is_whitespace) {
                return Err(Error::configuration(format!(
                    "id_generator.suffix '{suffix}' must be non-empty and contain no whitespace"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for registry configurations
#[derive(Debug, Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_ticket_policy(mut self, policy: ExpirationPolicyConfig) -> Self {
        self.config.service_ticket_policy = policy;
        self
    }

    pub fn ticket_granting_ticket_policy(mut self, policy: ExpirationPolicyConfig) -> Self {
        self.config.ticket_granting_ticket_policy = policy;
        self
    }

    pub fn proxy_granting_ticket_policy(mut self, policy: ExpirationPolicyConfig) -> Self {
        self.config.proxy_granting_ticket_policy = policy;
        self
    }

    pub fn id_random_length(mut self, length: usize) -> Self {
        self.config.id_generator.random_length = length;
        self
    }

    pub fn id_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.id_generator.suffix = Some(suffix.into());
        self
    }

    pub fn remove_expired_on_validation(mut self, remove: bool) -> Self {
        self.config.remove_expired_on_validation = remove;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<RegistryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
