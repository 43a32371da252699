//! Schema validation with default merging for configuration files.
//!
//! This crate checks an arbitrarily nested configuration mapping against a
//! [`Schema`] that declares, per key, either a required type or a default
//! value. It returns the configuration with every default filled in, or fails
//! on the first key that is missing or has the wrong type.
//!
//! - Type markers ([`SchemaNode::Required`]) must be present
//! - Default literals ([`SchemaNode::Default`]) are inserted when absent
//! - Nested schemas ([`SchemaNode::Nested`]) are validated recursively
//! - Keys not in the schema pass through, unless [`Validator::strict`] is set
//!
//! Decoding files is the job of [`ConfigLoader`]; the validator itself only
//! sees in-memory mappings and performs no I/O.
//!
//! # Example
//!
//! ```
//! use keel_config::{validate, Schema, SchemaError, ValueKind};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .nested(
//!         "log",
//!         Schema::new()
//!             .with_default("file", "stdout")
//!             .with_default("level", "INFO"),
//!     )
//!     .nested(
//!         "mysql",
//!         Schema::new()
//!             .required("host", ValueKind::String)
//!             .required("port", ValueKind::Integer),
//!     );
//!
//! let input = json!({"mysql": {"host": "db1", "port": "3306"}});
//! let err = validate(input.as_object().unwrap().clone(), &schema).unwrap_err();
//!
//! assert_eq!(
//!     err,
//!     SchemaError::type_mismatch("mysql.port", ValueKind::Integer, ValueKind::String)
//! );
//! ```
//!
//! # Configuration File Format
//!
//! ```yaml
//! log:
//!   file: /var/log/app.log
//!   level: DEBUG
//!
//! mysql:
//!   host: db1
//!   port: 3306
//! ```
//!
//! # Environment Variable Overrides
//!
//! With [`ConfigLoader::with_env_prefix`], values can be overridden using
//! `PREFIX__SECTION__KEY`, for example `KEEL__MYSQL__PORT=3307`.

#![warn(missing_docs)]

mod config;
mod error;
mod kind;
mod loader;
mod schema;
mod validate;

pub use config::Config;
pub use error::{ConfigError, SchemaError, SchemaErrorKind};
pub use kind::ValueKind;
pub use loader::{merge_maps, ConfigLoader, Format};
pub use schema::{Schema, SchemaNode};
pub use validate::{validate, Validator};
