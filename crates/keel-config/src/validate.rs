//! Recursive schema validation with default merging.
//!
//! The validator walks the schema, not the input. For every declared key it
//! either fills in the default, type-checks the present value, or recurses
//! into a nested mapping. It stops at the first violation.

use serde_json::{Map, Value};

use crate::{Schema, SchemaError, SchemaNode, ValueKind};

/// Validate `config` against `schema`, returning the defaulted mapping.
///
/// Keys the schema does not mention are passed through unchanged. Use
/// [`Validator::strict`] to reject them instead.
///
/// # Errors
///
/// - [`SchemaError::MissingKey`] when a required key is absent.
/// - [`SchemaError::TypeMismatch`] when a present value has the wrong kind.
pub fn validate(
    config: Map<String, Value>,
    schema: &Schema,
) -> Result<Map<String, Value>, SchemaError> {
    Validator::new(schema).validate(config)
}

/// Validator bound to a schema, with options.
///
/// # Example
///
/// ```
/// use keel_config::{Schema, SchemaError, Validator, ValueKind};
/// use serde_json::json;
///
/// let schema = Schema::new().required("host", ValueKind::String);
/// let input = json!({"host": "db1", "extra": 1});
///
/// let err = Validator::new(&schema)
///     .strict()
///     .validate_value(input)
///     .unwrap_err();
///
/// assert_eq!(err, SchemaError::unknown_key("extra"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a Schema,
    strict: bool,
}

impl<'a> Validator<'a> {
    /// Create a pass-through validator for `schema`.
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    /// Reject keys that the schema does not declare, at every level covered
    /// by a nested schema.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Set strict mode explicitly.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether unknown keys are rejected.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The schema this validator checks against.
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Validate a mapping.
    pub fn validate(&self, config: Map<String, Value>) -> Result<Map<String, Value>, SchemaError> {
        self.validate_mapping(config, self.schema, "")
    }

    /// Validate an arbitrary value whose root must be a mapping.
    ///
    /// A non-mapping root fails with a [`SchemaError::TypeMismatch`] whose
    /// path is empty.
    pub fn validate_value(&self, config: Value) -> Result<Map<String, Value>, SchemaError> {
        match config {
            Value::Object(map) => self.validate(map),
            other => Err(SchemaError::type_mismatch(
                "",
                ValueKind::Mapping,
                ValueKind::of(&other),
            )),
        }
    }

    fn validate_mapping(
        &self,
        mut config: Map<String, Value>,
        schema: &Schema,
        path: &str,
    ) -> Result<Map<String, Value>, SchemaError> {
        for (key, node) in schema.iter() {
            let full_key = join_path(path, key);

            if let Some(slot) = config.get_mut(key) {
                self.check_present(slot, node, &full_key)?;
            } else {
                let filled = self.fill_absent(node, &full_key)?;
                config.insert(key.clone(), filled);
            }
        }

        if self.strict {
            if let Some(unknown) = config.keys().find(|key| !schema.contains_key(key)) {
                return Err(SchemaError::unknown_key(join_path(path, unknown)));
            }
        }

        Ok(config)
    }

    fn check_present(
        &self,
        slot: &mut Value,
        node: &SchemaNode,
        full_key: &str,
    ) -> Result<(), SchemaError> {
        match node {
            SchemaNode::Nested(inner) => match slot.take() {
                Value::Object(map) => {
                    *slot = Value::Object(self.validate_mapping(map, inner, full_key)?);
                    Ok(())
                }
                other => Err(SchemaError::type_mismatch(
                    full_key,
                    ValueKind::Mapping,
                    ValueKind::of(&other),
                )),
            },
            leaf => {
                let expected = leaf.required_kind();
                let found = ValueKind::of(slot);
                if found == expected {
                    Ok(())
                } else {
                    Err(SchemaError::type_mismatch(full_key, expected, found))
                }
            }
        }
    }

    fn fill_absent(&self, node: &SchemaNode, full_key: &str) -> Result<Value, SchemaError> {
        match node {
            SchemaNode::Required(_) => Err(SchemaError::missing_key(full_key)),
            SchemaNode::Default(value) => Ok(value.clone()),
            // An absent section behaves like an empty one: its defaults are
            // filled in and its required keys are reported individually.
            SchemaNode::Nested(inner) => self
                .validate_mapping(Map::new(), inner, full_key)
                .map(Value::Object),
        }
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "mysql"), "mysql");
        assert_eq!(join_path("mysql", "source"), "mysql.source");
        assert_eq!(join_path("mysql.source", "host"), "mysql.source.host");
    }

    #[test]
    fn test_default_inserted_when_absent() {
        let schema = Schema::new().with_default("level", "INFO");
        let out = validate(Map::new(), &schema).unwrap();
        assert_eq!(out["level"], "INFO");
    }

    #[test]
    fn test_present_value_kept_over_default() {
        let schema = Schema::new().with_default("level", "INFO");
        let out = validate(map(json!({"level": "DEBUG"})), &schema).unwrap();
        assert_eq!(out["level"], "DEBUG");
    }

    #[test]
    fn test_wrong_type_not_replaced_by_default() {
        let schema = Schema::new().with_default("retries", 3);
        let err = validate(map(json!({"retries": "three"})), &schema).unwrap_err();
        assert_eq!(
            err,
            SchemaError::type_mismatch("retries", ValueKind::Integer, ValueKind::String)
        );
    }

    #[test]
    fn test_required_missing() {
        let schema = Schema::new().required("host", ValueKind::String);
        let err = validate(Map::new(), &schema).unwrap_err();
        assert_eq!(err, SchemaError::missing_key("host"));
    }

    #[test]
    fn test_boolean_is_not_integer() {
        let schema = Schema::new().required("port", ValueKind::Integer);
        let err = validate(map(json!({"port": true})), &schema).unwrap_err();
        assert_eq!(
            err,
            SchemaError::type_mismatch("port", ValueKind::Integer, ValueKind::Boolean)
        );
    }

    #[test]
    fn test_nested_path_in_error() {
        let schema = Schema::new().nested(
            "mysql",
            Schema::new().nested("source", Schema::new().required("host", ValueKind::String)),
        );
        let err = validate(map(json!({"mysql": {"source": {"host": 1}}})), &schema).unwrap_err();
        assert_eq!(err.path(), "mysql.source.host");
    }

    #[test]
    fn test_absent_nested_section_filled_from_defaults() {
        let schema = Schema::new().nested(
            "log",
            Schema::new()
                .with_default("file", "stdout")
                .with_default("level", "INFO"),
        );
        let out = validate(Map::new(), &schema).unwrap();
        assert_eq!(out["log"], json!({"file": "stdout", "level": "INFO"}));
    }

    #[test]
    fn test_absent_nested_section_with_required_key() {
        let schema =
            Schema::new().nested("mysql", Schema::new().required("host", ValueKind::String));
        let err = validate(Map::new(), &schema).unwrap_err();
        assert_eq!(err, SchemaError::missing_key("mysql.host"));
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let schema =
            Schema::new().nested("mysql", Schema::new().required("host", ValueKind::String));
        let input = json!({"extra": [1, 2], "mysql": {"host": "db1", "charset": "utf8"}});
        let out = validate(map(input.clone()), &schema).unwrap();
        assert_eq!(Value::Object(out), input);
    }

    #[test]
    fn test_strict_rejects_unknown_nested_key() {
        let schema =
            Schema::new().nested("mysql", Schema::new().required("host", ValueKind::String));
        let err = Validator::new(&schema)
            .strict()
            .validate(map(json!({"mysql": {"host": "db1", "charset": "utf8"}})))
            .unwrap_err();
        assert_eq!(err, SchemaError::unknown_key("mysql.charset"));
    }

    #[test]
    fn test_strict_does_not_descend_into_unschematized_mapping() {
        let schema = Schema::new().required("extra", ValueKind::Mapping);
        let out = Validator::new(&schema)
            .strict()
            .validate(map(json!({"extra": {"anything": 1}})))
            .unwrap();
        assert_eq!(out["extra"]["anything"], 1);
    }

    #[test]
    fn test_validate_value_rejects_scalar_root() {
        let schema = Schema::new();
        let err = Validator::new(&schema).validate_value(json!(42)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::type_mismatch("", ValueKind::Mapping, ValueKind::Integer)
        );
    }

    #[test]
    fn test_defaults_are_copied() {
        let schema = Schema::new().with_default("tags", json!(["a"]));
        let mut out = validate(Map::new(), &schema).unwrap();
        out["tags"].as_array_mut().unwrap().push(json!("b"));
        assert_eq!(schema.get("tags"), Some(&SchemaNode::Default(json!(["a"]))));
    }

    #[test]
    fn test_validator_options() {
        let schema = Schema::new();
        let validator = Validator::new(&schema);
        assert!(!validator.is_strict());
        assert!(validator.with_strict(true).is_strict());
        assert!(validator.schema().is_empty());
    }
}
