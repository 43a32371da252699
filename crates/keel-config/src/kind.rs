//! Value kinds used to type-check configuration values.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The primitive shape of a configuration value.
///
/// Kinds are compared exactly. There is no coercion between kinds: a boolean
/// never satisfies [`ValueKind::Integer`], and an integer never satisfies
/// [`ValueKind::Float`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// An explicit null (`~` or `null`).
    Null,
    /// `true` or `false`.
    Boolean,
    /// A whole number that fits in `i64` or `u64`.
    Integer,
    /// Any other number.
    Float,
    /// A text value.
    String,
    /// A list of values.
    Sequence,
    /// A string-keyed mapping.
    Mapping,
}

impl ValueKind {
    /// Classify a value.
    ///
    /// # Example
    ///
    /// ```
    /// use keel_config::ValueKind;
    /// use serde_json::json;
    ///
    /// assert_eq!(ValueKind::of(&json!(3306)), ValueKind::Integer);
    /// assert_eq!(ValueKind::of(&json!(true)), ValueKind::Boolean);
    /// assert_eq!(ValueKind::of(&json!({"host": "db1"})), ValueKind::Mapping);
    /// ```
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Sequence,
            Value::Object(_) => Self::Mapping,
        }
    }

    /// Whether `value` has exactly this kind.
    pub fn matches(self, value: &Value) -> bool {
        Self::of(value) == self
    }

    /// Lowercase name used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
