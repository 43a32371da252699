//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::ValueKind;

/// Errors raised by the schema validator.
///
/// Validation is fail-fast: the first violation aborts the whole call and is
/// reported with the dotted key path where it was found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A key declared with a type marker (no default) is absent.
    #[error("the key \"{path}\" is absent")]
    MissingKey {
        /// Dotted path of the missing key.
        path: String,
    },

    /// A present value does not have the type the schema requires.
    #[error("the key \"{path}\" must be {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the offending value.
        path: String,
        /// Kind required by the schema.
        expected: ValueKind,
        /// Kind actually found in the input.
        found: ValueKind,
    },

    /// A key not declared in the schema was found while validating in
    /// strict mode.
    #[error("the key \"{path}\" is not allowed by the schema")]
    UnknownKey {
        /// Dotted path of the unexpected key.
        path: String,
    },
}

/// Discriminant of a [`SchemaError`], for callers that branch on the kind
/// without caring about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// See [`SchemaError::MissingKey`].
    MissingKey,
    /// See [`SchemaError::TypeMismatch`].
    TypeMismatch,
    /// See [`SchemaError::UnknownKey`].
    UnknownKey,
}

impl SchemaError {
    /// Create a new missing key error.
    pub fn missing_key(path: impl Into<String>) -> Self {
        Self::MissingKey { path: path.into() }
    }

    /// Create a new type mismatch error.
    pub fn type_mismatch(path: impl Into<String>, expected: ValueKind, found: ValueKind) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
            found,
        }
    }

    /// Create a new unknown key error.
    pub fn unknown_key(path: impl Into<String>) -> Self {
        Self::UnknownKey { path: path.into() }
    }

    /// Dotted key path the error refers to. Empty for the root mapping.
    pub fn path(&self) -> &str {
        match self {
            Self::MissingKey { path }
            | Self::TypeMismatch { path, .. }
            | Self::UnknownKey { path } => path,
        }
    }

    /// The error kind.
    pub fn kind(&self) -> SchemaErrorKind {
        match self {
            Self::MissingKey { .. } => SchemaErrorKind::MissingKey,
            Self::TypeMismatch { .. } => SchemaErrorKind::TypeMismatch,
            Self::UnknownKey { .. } => SchemaErrorKind::UnknownKey,
        }
    }
}

/// Errors that can occur while loading, validating, or reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error.
    #[error("failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The configuration format could not be determined or is not supported.
    #[error("unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The extension or format name that was rejected.
        format: String,
    },

    /// The document root decoded to something other than a mapping.
    #[error("configuration root must be a mapping, found {found}")]
    NotAMapping {
        /// Kind the root decoded to.
        found: ValueKind,
    },

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },

    /// The configuration did not satisfy its schema.
    #[error("configuration validation failed: {0}")]
    Schema(#[from] SchemaError),

    /// A validated section could not be converted into a typed value.
    #[error("failed to read configuration section {path}: {reason}")]
    Deserialize {
        /// Dotted path of the section.
        path: String,
        /// Explanation from the deserializer.
        reason: String,
    },
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a new environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new deserialize error.
    pub fn deserialize(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Deserialize {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
