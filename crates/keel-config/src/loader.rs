//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for decoding configuration from
//! files, strings, and environment variables into a single raw mapping, which
//! is then handed to the validator.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::{Config, ConfigError, Schema, SchemaNode, Validator, ValueKind};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
    /// TOML (`.toml`).
    Toml,
}

impl Format {
    /// Resolve a format from a name or file extension, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Resolve a format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_name)
    }

    /// Decode `content` into a mapping.
    ///
    /// An empty YAML document decodes to an empty mapping.
    pub fn parse(self, content: &str) -> Result<Map<String, Value>, ConfigError> {
        let value: Value = match self {
            Self::Yaml if content.trim().is_empty() => return Ok(Map::new()),
            Self::Yaml => {
                let value: Value = serde_yaml::from_str(content)?;
                if value.is_null() {
                    Value::Object(Map::new())
                } else {
                    value
                }
            }
            Self::Json => serde_json::from_str(content)?,
            Self::Toml => toml::from_str(content)?,
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(ConfigError::NotAMapping {
                found: ValueKind::of(&other),
            }),
        }
    }
}

/// Configuration loader with layered approach.
///
/// Sources are merged in the order they are added, later sources overriding
/// earlier ones key by key:
/// 1. Configuration files and strings (YAML, JSON, or TOML)
/// 2. Environment variables (applied at load time)
///
/// # Example
///
/// ```no_run
/// use keel_config::{ConfigLoader, Schema, ValueKind};
///
/// # fn main() -> Result<(), keel_config::ConfigError> {
/// let schema = Schema::new().nested(
///     "mysql",
///     Schema::new().required("host", ValueKind::String),
/// );
///
/// let config = ConfigLoader::new()
///     .with_file(".config.yaml")?
///     .with_env_prefix("KEEL")
///     .load_with(&schema)?;
///
/// println!("database host: {:?}", config.get_str("mysql.host"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: Map<String, Value>,
    env_prefix: Option<String>,
    sources: usize,
}

impl ConfigLoader {
    /// Create a new loader with an empty root mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file.
    ///
    /// The format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is not a supported format
    /// - The content does not parse, or its root is not a mapping
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = Format::from_path(path)
            .ok_or_else(|| ConfigError::unsupported_format(path.display().to_string()))?;

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let layer = format.parse(&content)?;
        tracing::debug!(path = %path.display(), keys = layer.len(), "merged configuration file");
        self.merge(layer);

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            tracing::debug!(path = %path.as_ref().display(), "optional configuration file absent");
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Arguments
    ///
    /// * `content` - Configuration content
    /// * `format` - Format name ("yaml", "yml", "json" or "toml")
    ///
    /// # Example
    ///
    /// ```
    /// use keel_config::ConfigLoader;
    ///
    /// let raw = ConfigLoader::new()
    ///     .with_string("mysql:\n  port: 3306\n", "yaml")
    ///     .unwrap()
    ///     .load_unvalidated();
    ///
    /// assert_eq!(raw["mysql"]["port"], 3306);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let format =
            Format::from_name(format).ok_or_else(|| ConfigError::unsupported_format(format))?;
        let layer = format.parse(content)?;
        self.merge(layer);
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY` and override the
    /// lowercased dotted path `section.key`. Values are read as YAML scalars,
    /// so `3306` becomes an integer, `true` a boolean and `'3306'` the string
    /// `3306`. When loading against a schema, a key declared as a string
    /// always takes the value as text.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "loaded .env file");
                Ok(self)
            }
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::env_parse_error(".env", e.to_string())),
        }
    }

    /// Number of file or string sources merged so far.
    pub fn source_count(&self) -> usize {
        self.sources
    }

    /// Finalize without validation, applying environment overrides.
    ///
    /// Malformed environment variables are skipped with a warning; use
    /// [`ConfigLoader::load`] to have them reported as errors.
    #[must_use]
    pub fn load_unvalidated(mut self) -> Map<String, Value> {
        if let Some(prefix) = self.env_prefix.take() {
            for (key, value) in env_vars(&prefix) {
                if let Err(e) = apply_env_var(&mut self.config, &key, &value, &prefix, None) {
                    tracing::warn!(error = %e, "ignoring environment override");
                }
            }
        }
        self.config
    }

    /// Finalize, apply environment overrides, and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment override is malformed or the
    /// merged configuration does not satisfy the validator's schema.
    pub fn load(mut self, validator: &Validator<'_>) -> Result<Config, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let schema = validator.schema();
            for (key, value) in env_vars(&prefix) {
                apply_env_var(&mut self.config, &key, &value, &prefix, Some(schema))?;
            }
        }

        let validated = validator.validate(self.config)?;
        Ok(Config::from_validated(validated))
    }

    /// Finalize and validate against `schema` in pass-through mode.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_with(self, schema: &Schema) -> Result<Config, ConfigError> {
        self.load(&Validator::new(schema))
    }

    fn merge(&mut self, layer: Map<String, Value>) {
        merge_maps(&mut self.config, layer);
        self.sources += 1;
    }
}

/// Deep-merge `layer` into `base`. Mappings merge recursively; any other
/// value replaces what was there.
pub fn merge_maps(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_maps(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn env_vars(prefix: &str) -> Vec<(String, String)> {
    let mut vars: Vec<_> = env::vars()
        .filter(|(k, _)| k.starts_with(prefix))
        .collect();
    vars.sort();
    vars
}

// Apply a single `PREFIX__A__B=value` override to `config`. With a schema,
// the value is typed by the kind declared at that path.
fn apply_env_var(
    config: &mut Map<String, Value>,
    key: &str,
    value: &str,
    prefix: &str,
    schema: Option<&Schema>,
) -> Result<(), ConfigError> {
    let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
        // Shares the prefix text but is not one of ours (e.g. `KEELHAUL`).
        return Ok(());
    };

    let segments: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
    if segments.iter().any(String::is_empty) {
        return Err(ConfigError::env_parse_error(key, "empty key segment"));
    }

    let parsed = match schema.and_then(|s| declared_kind(s, &segments)) {
        Some(ValueKind::String) => parse_text(value),
        _ => parse_scalar(value),
    };
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| ConfigError::env_parse_error(key, "empty key"))?;

    let mut node = config;
    for segment in parents {
        let entry = node
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        node = entry
            .as_object_mut()
            .ok_or_else(|| ConfigError::env_parse_error(key, "cannot descend into value"))?;
    }
    node.insert(last.clone(), parsed);

    Ok(())
}

// Kind of the leaf the schema declares at `segments`, if any.
fn declared_kind(schema: &Schema, segments: &[String]) -> Option<ValueKind> {
    let (last, parents) = segments.split_last()?;
    let mut schema = schema;
    for segment in parents {
        match schema.get(segment)? {
            SchemaNode::Nested(inner) => schema = inner,
            _ => return None,
        }
    }
    schema.get(last).map(SchemaNode::required_kind)
}

// Read an environment value as a YAML scalar; anything that is not a scalar
// (or does not parse) is kept as the raw string.
fn parse_scalar(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(v @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => v,
        _ => Value::String(value.to_string()),
    }
}

// Read an environment value as text, unquoting a quoted YAML string.
fn parse_text(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(v @ Value::String(_)) => v,
        _ => Value::String(value.to_string()),
    }
}
