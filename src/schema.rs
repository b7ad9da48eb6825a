//! Schema validation for merged configuration trees.
//!
//! Validation sits behind the [`SchemaValidator`] trait so the pipeline
//! stays agnostic of the schema language. The shipped implementation is
//! backed by JSON Schema; anything able to pass a verdict on a
//! `serde_json::Value` can slot in.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;

/// Capability for validating a merged configuration tree.
///
/// The pipeline invokes this exactly once per run, after composition and
/// before secret resolution. A rejection verdict is propagated with the
/// engine's diagnostics unmodified; the pipeline never retries.
pub trait SchemaValidator {
    fn validate(&self, tree: &Value) -> anyhow::Result<()>;
}

/// JSON Schema backed validator.
///
/// Reports every violation in one verdict rather than stopping at the
/// first, one line per violation prefixed with the offending location.
#[derive(Debug)]
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Build a validator from a schema document.
    pub fn new(schema: &Value) -> anyhow::Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| anyhow::anyhow!("invalid schema: {e}"))?;
        Ok(Self { validator })
    }

    /// Build a validator from a schema file. The file may be YAML or JSON,
    /// since JSON parses as YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        let schema: Value =
            serde_yaml::from_str(&content).map_err(|source| Error::parse(path, source))?;
        Self::new(&schema).map_err(|cause| Error::Validation { cause })
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, tree: &Value) -> anyhow::Result<()> {
        let mut violations: Vec<String> = Vec::new();
        for err in self.validator.iter_errors(tree) {
            let location = err.instance_path.to_string();
            if location.is_empty() {
                violations.push(err.to_string());
            } else {
                violations.push(format!("{location}: {err}"));
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("{}", violations.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "image": {"type": "string"},
                "replicas": {"type": "integer", "minimum": 1},
                "db": {
                    "type": "object",
                    "properties": {
                        "host": {"type": "string"}
                    },
                    "required": ["host"]
                }
            },
            "required": ["image", "replicas"],
            "additionalProperties": false
        })
    }

    #[test]
    fn test_valid_tree_passes() {
        let validator = JsonSchemaValidator::new(&service_schema()).unwrap();
        let tree = json!({"image": "api", "replicas": 3});
        assert!(validator.validate(&tree).is_ok());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let validator = JsonSchemaValidator::new(&service_schema()).unwrap();
        let tree = json!({"image": "api"});
        let err = validator.validate(&tree).unwrap_err();
        assert!(err.to_string().contains("replicas"), "got: {err}");
    }

    #[test]
    fn test_type_mismatch_rejected_with_location() {
        let validator = JsonSchemaValidator::new(&service_schema()).unwrap();
        let tree = json!({"image": "api", "replicas": "three"});
        let err = validator.validate(&tree).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("/replicas"), "got: {text}");
    }

    #[test]
    fn test_extra_field_rejected_by_closed_schema() {
        let validator = JsonSchemaValidator::new(&service_schema()).unwrap();
        let tree = json!({"image": "api", "replicas": 3, "unexpected": true});
        assert!(validator.validate(&tree).is_err());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let validator = JsonSchemaValidator::new(&service_schema()).unwrap();
        let tree = json!({"image": 7, "replicas": 0});
        let err = validator.validate(&tree).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("/image"), "got: {text}");
        assert!(text.contains("/replicas"), "got: {text}");
    }

    #[test]
    fn test_nested_violation_reports_inner_path() {
        let validator = JsonSchemaValidator::new(&service_schema()).unwrap();
        let tree = json!({"image": "api", "replicas": 3, "db": {"pool": 5}});
        let err = validator.validate(&tree).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("/db"), "got: {text}");
    }

    #[test]
    fn test_schema_file_may_be_yaml() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("schema.yaml");
        std::fs::write(
            &path,
            "type: object\nrequired:\n  - image\nproperties:\n  image:\n    type: string\n",
        )
        .unwrap();

        let validator = JsonSchemaValidator::from_file(&path).unwrap();
        assert!(validator.validate(&json!({"image": "api"})).is_ok());
        assert!(validator.validate(&json!({})).is_err());
    }

    #[test]
    fn test_invalid_schema_is_validation_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("schema.yaml");
        std::fs::write(&path, "type: not-a-real-type\n").unwrap();

        let err = JsonSchemaValidator::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "got {err:?}");
    }
}
