//! Schema types.
//!
//! A [`Schema`] is an ordered mapping from keys to [`SchemaNode`]s. Each node
//! is one of three explicit shapes, so whether a leaf carries a default is
//! visible in the type rather than inferred from the value:
//!
//! - [`SchemaNode::Required`]: the key must be present and have the kind.
//! - [`SchemaNode::Default`]: the key may be absent; when present it must have
//!   the default value's kind.
//! - [`SchemaNode::Nested`]: the key holds a mapping validated recursively.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{SchemaError, ValueKind};

/// A single schema entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Type marker: the key is required and must have this kind.
    Required(ValueKind),

    /// Default literal: inserted when the key is absent. Its own kind is the
    /// required kind when the key is present.
    Default(Value),

    /// Nested schema: the key must hold a mapping.
    Nested(Schema),
}

impl SchemaNode {
    /// The kind a present value must have.
    pub fn required_kind(&self) -> ValueKind {
        match self {
            Self::Required(kind) => *kind,
            Self::Default(value) => ValueKind::of(value),
            Self::Nested(_) => ValueKind::Mapping,
        }
    }

    /// The default value, if the node carries one.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Self::Default(value) => Some(value),
            _ => None,
        }
    }

    /// Whether an absent key is an error for this node.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required(_))
    }
}

impl From<Schema> for SchemaNode {
    fn from(schema: Schema) -> Self {
        Self::Nested(schema)
    }
}

impl From<ValueKind> for SchemaNode {
    fn from(kind: ValueKind) -> Self {
        Self::Required(kind)
    }
}

/// An ordered set of keys with their required types and defaults.
///
/// # Example
///
/// ```
/// use keel_config::{Schema, ValueKind};
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .nested(
///         "log",
///         Schema::new()
///             .with_default("file", "stdout")
///             .with_default("level", "INFO"),
///     )
///     .nested(
///         "mysql",
///         Schema::new()
///             .required("host", ValueKind::String)
///             .required("port", ValueKind::Integer),
///     );
///
/// let input = json!({"mysql": {"host": "db1", "port": 3306}});
/// let output = schema.validate(input.as_object().unwrap().clone()).unwrap();
///
/// assert_eq!(output["log"]["level"], "INFO");
/// assert_eq!(output["mysql"]["port"], 3306);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: IndexMap<String, SchemaNode>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required key of the given kind.
    #[must_use]
    pub fn required(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.insert(key, SchemaNode::Required(kind));
        self
    }

    /// Declare an optional key with a default value.
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, SchemaNode::Default(value.into()));
        self
    }

    /// Declare a key holding a nested mapping.
    #[must_use]
    pub fn nested(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.insert(key, SchemaNode::Nested(schema));
        self
    }

    /// Insert or replace a node, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        self.fields.insert(key.into(), node)
    }

    /// Look up the node declared for `key`.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.fields.get(key)
    }

    /// Whether `key` is declared at this level.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate over declared keys in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.fields.iter()
    }

    /// Number of keys declared at this level.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate `config` against this schema in pass-through mode.
    ///
    /// Shorthand for [`crate::validate`].
    pub fn validate(&self, config: Map<String, Value>) -> Result<Map<String, Value>, SchemaError> {
        crate::validate(config, self)
    }
}

impl<K: Into<String>> FromIterator<(K, SchemaNode)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, SchemaNode)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
