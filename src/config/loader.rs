//! Configuration loading from disk.
//!
//! Two entry points: `load_config` for the typed service configuration, and
//! `Config` for applications that want free-form key/section lookups over a
//! TOML file of their own.

use std::fs;
use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("configuration key '{0}' not set in configuration file")]
    MissingKey(String),

    #[error("configuration key '{key}' in section '{section}' not set in configuration file")]
    MissingSectionKey { section: String, key: String },

    #[error("configuration section '{0}' not set in configuration file")]
    MissingSection(String),

    #[error("unable to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Free-form configuration read from a TOML document.
///
/// Top-level keys are plain values; tables are sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: Table,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            values: content.parse::<Table>()?,
        })
    }

    /// A top-level value. Missing required keys are an error; missing
    /// optional keys are `Ok(None)`.
    pub fn value(&self, key: &str, required: bool) -> Result<Option<&Value>, ConfigError> {
        match self.values.get(key) {
            Some(value) => Ok(Some(value)),
            None if required => Err(ConfigError::MissingKey(key.to_string())),
            None => Ok(None),
        }
    }

    pub fn section_value(
        &self,
        section: &str,
        key: &str,
        required: bool,
    ) -> Result<Option<&Value>, ConfigError> {
        let value = self
            .values
            .get(section)
            .and_then(Value::as_table)
            .and_then(|t| t.get(key));
        match value {
            Some(value) => Ok(Some(value)),
            None if required => Err(ConfigError::MissingSectionKey {
                section: section.to_string(),
                key: key.to_string(),
            }),
            None => Ok(None),
        }
    }

    pub fn section_values(&self, section: &str, required: bool) -> Result<Option<&Table>, ConfigError> {
        match self.values.get(section).and_then(Value::as_table) {
            Some(table) => Ok(Some(table)),
            None if required => Err(ConfigError::MissingSection(section.to_string())),
            None => Ok(None),
        }
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Set a value inside a section, creating the section when needed. A
    /// plain value stored under the section name is replaced by a table.
    pub fn set_section_value(
        &mut self,
        section: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        let entry = self
            .values
            .entry(section)
            .or_insert(Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        if let Value::Table(table) = entry {
            table.insert(key.into(), value.into());
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(&self.values)?)
    }
}
