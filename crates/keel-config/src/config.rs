//! Validated configuration.
//!
//! This module provides [`Config`], the process-wide configuration produced
//! once a raw mapping has passed schema validation.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ConfigError;

/// A configuration mapping that has passed schema validation.
///
/// Lookups take dotted key paths such as `mysql.port`.
///
/// # Example
///
/// ```
/// use keel_config::{ConfigLoader, Schema, ValueKind};
///
/// let schema = Schema::new().nested(
///     "mysql",
///     Schema::new()
///         .required("host", ValueKind::String)
///         .with_default("port", 3306),
/// );
///
/// let config = ConfigLoader::new()
///     .with_string("mysql:\n  host: db1\n", "yaml")
///     .unwrap()
///     .load_with(&schema)
///     .unwrap();
///
/// assert_eq!(config.get_i64("mysql.port"), Some(3306));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Config {
    values: Map<String, Value>,
}

impl Config {
    /// Wrap a mapping returned by the validator.
    pub fn from_validated(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Look up a value by dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.values.get(first)?, |value, segment| {
            value.as_object()?.get(segment)
        })
    }

    /// Look up a string value by dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Look up an integer value by dotted path.
    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// Look up a boolean value by dotted path.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Deserialize the section at `path` into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Deserialize`] if the section is absent or does
    /// not match `T`.
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = self
            .get(path)
            .ok_or_else(|| ConfigError::deserialize(path, "section is absent"))?;
        T::deserialize(value).map_err(|e| ConfigError::deserialize(path, e.to_string()))
    }

    /// Borrow the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consume the configuration, returning the underlying mapping.
    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}
