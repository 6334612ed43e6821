//! Start-up configuration read from the function environment.

use thiserror::Error;

use crate::logging::LogFormat;

pub const PARAMETER_NAME_ENV: &str = "BUDGET_PARAMETER_NAME";
pub const ROLE_NAME_ENV: &str = "SPOKE_ROLE_NAME";
pub const SESSION_NAME_ENV: &str = "ROLE_SESSION_NAME";
pub const PARTITION_ENV: &str = "AWS_PARTITION";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_SESSION_NAME: &str = "budget-sync";
pub const DEFAULT_PARTITION: &str = "aws";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),

    #[error("{name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Parameter overwritten in every spoke account.
    pub parameter_name: String,
    /// Role assumed in every spoke account.
    pub role_name: String,
    pub session_name: String,
    pub partition: String,
    pub log_format: LogFormat,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let parameter_name =
            read(PARAMETER_NAME_ENV).ok_or(ConfigError::Missing(PARAMETER_NAME_ENV))?;
        let role_name = read(ROLE_NAME_ENV).ok_or(ConfigError::Missing(ROLE_NAME_ENV))?;
        let log_format = match read(LOG_FORMAT_ENV) {
            Some(value) => value.parse().map_err(|message| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                message,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            parameter_name,
            role_name,
            session_name: read(SESSION_NAME_ENV)
                .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
            partition: read(PARTITION_ENV).unwrap_or_else(|| DEFAULT_PARTITION.to_string()),
            log_format,
        })
    }

    pub fn role_arn(&self, account_id: &str) -> String {
        format!(
            "arn:{}:iam::{}:role/{}",
            self.partition, account_id, self.role_name
        )
    }
}
