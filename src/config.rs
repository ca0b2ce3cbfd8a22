use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised while building or decoding a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {0}")]
    Missing(&'static str),

    #[error("malformed connection string: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Connection parameters for the remote statement service.
///
/// A `Config` is built once and shared read-only by every connection opened
/// from it. The connection-string form is the JSON encoding produced by
/// [`Config::to_dsn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
    #[serde(rename = "aws_region")]
    pub region: String,
    #[serde(default)]
    pub parse_time: bool,
}

impl Config {
    /// Create a configuration with `parse_time` disabled.
    ///
    /// The identifiers are not checked here. [`Config::validate`] runs when a
    /// connection is opened, as well as in [`ConfigBuilder::build`] and
    /// [`Config::from_dsn`], so every config that can connect also survives
    /// a DSN round-trip.
    pub fn new(
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: database.into(),
            region: region.into(),
            parse_time: false,
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn with_parse_time(mut self, parse_time: bool) -> Self {
        self.parse_time = parse_time;
        self
    }

    /// Encode this configuration as a connection string.
    pub fn to_dsn(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a connection string produced by [`Config::to_dsn`].
    ///
    /// Every identifier must be present and non-empty.
    pub fn from_dsn(dsn: &str) -> Result<Self, ConfigError> {
        let conf: Config = serde_json::from_str(dsn)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Fail on the first empty identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("resource_arn", &self.resource_arn),
            ("secret_arn", &self.secret_arn),
            ("database", &self.database),
            ("region", &self.region),
        ];
        match required.into_iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(ConfigError::Missing(field)),
            None => Ok(()),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dsn(s)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dsn = self.to_dsn().map_err(|_| fmt::Error)?;
        f.write_str(&dsn)
    }
}

/// Fallible, field-by-field construction of a [`Config`].
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    resource_arn: Option<String>,
    secret_arn: Option<String>,
    database: Option<String>,
    region: Option<String>,
    parse_time: bool,
}

impl ConfigBuilder {
    pub fn resource_arn(mut self, arn: impl Into<String>) -> Self {
        self.resource_arn = Some(arn.into());
        self
    }

    pub fn secret_arn(mut self, arn: impl Into<String>) -> Self {
        self.secret_arn = Some(arn.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn parse_time(mut self, parse_time: bool) -> Self {
        self.parse_time = parse_time;
        self
    }

    /// Build the configuration, failing on the first absent or empty field.
    pub fn build(self) -> Result<Config, ConfigError> {
        let conf = Config {
            resource_arn: self.resource_arn.unwrap_or_default(),
            secret_arn: self.secret_arn.unwrap_or_default(),
            database: self.database.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            parse_time: self.parse_time,
        };
        conf.validate()?;
        Ok(conf)
    }
}
