use std::{fmt, str::FromStr, time::Duration};

use rdl_daily::{SelectionScope, StreakPolicy};
use serde::Deserialize;
use thiserror::Error;

/// Every variable the configuration reads, used to collect Shuttle secrets.
pub const CONFIG_KEYS: &[&str] = &[
    "DATABASE_URL",
    "ENV",
    "PORT",
    "DB_MAX_CONNECTIONS",
    "DB_ACQUIRE_TIMEOUT_SECS",
    "JWT_SECRET",
    "JWT_AUDIENCE",
    "STREAK_POLICY",
    "SELECTION_SCOPE",
    "RATE_LIMIT_PER_SECOND",
    "RATE_LIMIT_BURST",
];

const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment environment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Invalid(format!("unknown environment '{other}'"))),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Service configuration, read from environment variables (see [`CONFIG_KEYS`]).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    /// Required by the stand-alone server, Shuttle provides its own pool
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
    /// HS256 secret of the auth backend. Bearer tokens are only checked when set.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,
    #[serde(default)]
    pub streak_policy: StreakPolicy,
    #[serde(default)]
    pub selection_scope: SelectionScope,
    #[serde(default = "default_rate_limit_per_second")]
    pub rate_limit_per_second: u64,
    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
}

const fn default_port() -> u16 {
    3000
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_db_acquire_timeout_secs() -> u64 {
    5
}

fn default_jwt_audience() -> String {
    "authenticated".to_string()
}

const fn default_rate_limit_per_second() -> u64 {
    10
}

const fn default_rate_limit_burst() -> u32 {
    20
}

impl ApiConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load the configuration from Shuttle secrets.
    #[cfg(feature = "shuttle")]
    pub fn from_shuttle_secrets(secrets: &shuttle_runtime::SecretStore) -> Result<Self, ConfigError> {
        Self::from_vars(
            CONFIG_KEYS
                .iter()
                .filter_map(|key| secrets.get(key).map(|value| ((*key).to_string(), value))),
        )
    }

    /// Load the configuration from `(NAME, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config: Self = envy::from_iter(vars)?;

        config.database_url = config.database_url.filter(|url| !url.trim().is_empty());
        config.jwt_secret = config.jwt_secret.filter(|secret| !secret.trim().is_empty());

        if let Some(secret) = &config.jwt_secret {
            if secret.len() < MIN_JWT_SECRET_LEN {
                return Err(ConfigError::Invalid(format!(
                    "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters"
                )));
            }
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "DB_MAX_CONNECTIONS must be greater than zero".to_string(),
            ));
        }
        if config.rate_limit_per_second == 0 || config.rate_limit_burst == 0 {
            return Err(ConfigError::Invalid(
                "RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub const fn db_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/riddles")]))
            .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/riddles"));
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(config.jwt_secret, None);
        assert_eq!(config.jwt_audience, "authenticated");
        assert_eq!(config.streak_policy, StreakPolicy::Unconditional);
        assert_eq!(config.selection_scope, SelectionScope::PerUser);
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_vars(vars(&[
            ("ENV", "production"),
            ("PORT", "8080"),
            ("STREAK_POLICY", "consecutive"),
            ("SELECTION_SCOPE", "global"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ]))
        .unwrap();

        assert!(config.env.is_production());
        assert_eq!(config.port, 8080);
        assert_eq!(config.streak_policy, StreakPolicy::Consecutive);
        assert_eq!(config.selection_scope, SelectionScope::Global);
        assert!(config.jwt_secret.is_some());
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_enum_values_ignore_case() {
        let config = ApiConfig::from_vars(vars(&[
            ("ENV", "Prod"),
            ("STREAK_POLICY", " Consecutive"),
            ("SELECTION_SCOPE", "GLOBAL"),
        ]))
        .unwrap();

        assert_eq!(config.env, Environment::Production);
        assert_eq!(config.streak_policy, StreakPolicy::Consecutive);
        assert_eq!(config.selection_scope, SelectionScope::Global);
    }

    #[test]
    fn test_blank_secret_disables_auth() {
        let config = ApiConfig::from_vars(vars(&[("JWT_SECRET", "  ")])).unwrap();
        assert_eq!(config.jwt_secret, None);
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = ApiConfig::from_vars(vars(&[("JWT_SECRET", "short")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = ApiConfig::from_vars(vars(&[("STREAK_POLICY", "weekly")]));
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Development".parse::<Environment>().unwrap(), Environment::Development);
        assert!("staging".parse::<Environment>().is_err());
    }
}
