use std::{collections::HashMap, path::Path};

use config::ConfigError;
use serde::Deserialize;

pub const CONFIGURATION_DIRECTORY: &str = "configuration";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    pub detection_service: DetectionServiceConfig,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.try_into().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectionServiceConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Full URL; wins over host/port/path when set.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Config {
    /// Command-line flags win over every configuration layer.
    pub fn apply_overrides(
        &mut self,
        endpoint: Option<String>,
        log_level: Option<String>,
    ) -> Result<(), String> {
        if let Some(level) = log_level {
            self.log_level = LogLevel::try_from(level)?;
        }
        if let Some(endpoint) = endpoint {
            self.detection_service.endpoint = Some(endpoint);
        }
        Ok(())
    }
}

impl DetectionServiceConfig {
    pub fn get_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("http://{}:{}{}", self.host, self.port, self.path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "{} is not a supported minimum log level. Use one of `debug`, `info`, `warn` or `error`.",
                other
            )),
        }
    }
}

/// Loads settings from `./configuration` and `SC_*` variables, picking the
/// environment file from `APP_ENVIRONMENT`.
pub fn get_configuration() -> Result<Config, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {e}")))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    load_configuration(&base_path.join(CONFIGURATION_DIRECTORY), environment)
}

/// Defaults, then `base.yaml`, then `{environment}.yaml`, then `SC_*` variables.
/// Missing files are skipped.
pub fn load_configuration(
    configuration_directory: &Path,
    environment: Environment,
) -> Result<Config, ConfigError> {
    load_configuration_with_vars(configuration_directory, environment, None)
}

/// Same as [`load_configuration`], reading `SC_*` variables from `vars`
/// instead of the process environment when given.
pub fn load_configuration_with_vars(
    configuration_directory: &Path,
    environment: Environment,
    vars: Option<HashMap<String, String>>,
) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .set_default("log_level", "info")?
        .set_default("detection_service.host", "localhost")?
        .set_default("detection_service.port", 8000)?
        .set_default("detection_service.path", "/detect")?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(
                configuration_directory.join(format!("{}.yaml", environment.as_str())),
            )
            .required(false),
        )
        .add_source(
            config::Environment::with_prefix("SC")
                .prefix_separator("_")
                .separator("__")
                .source(vars),
        )
        .build()?;

    config.try_deserialize::<Config>()
}
