//! # Runtime Schema Validation
//!
//! Validates package documents against the embedded JSON Schema set.
//! Resolves `$ref` URIs internally by mapping
//! `https://packlint.dev/schemas/{name}` to the embedded schema files.
//!
//! The [`SchemaValidator`] parses all embedded schemas at construction
//! time, builds a URI → schema map for `$ref` resolution, and validates
//! each document against the schema for its layer. Validation errors carry
//! structured diagnostic context: the schema `$id`, the JSON Pointer to the
//! violating field, and a human-readable message.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use packlint_core::{Layer, RuleId, Violation};

/// URI prefix shared by all packlint schemas.
const SCHEMA_URI_PREFIX: &str = "https://packlint.dev/schemas/";

/// The embedded schema corpus: `(filename, content)` pairs.
const BUILTIN_SCHEMAS: &[(&str, &str)] = &[
    (
        "substitutions.schema.json",
        include_str!("../schemas/substitutions.schema.json"),
    ),
    (
        "package.schema.json",
        include_str!("../schemas/package.schema.json"),
    ),
    (
        "firmware.schema.json",
        include_str!("../schemas/firmware.schema.json"),
    ),
];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Structured validation error with diagnostic context.
#[derive(Debug, Clone)]
pub struct SchemaValidationDetail {
    /// The JSON Schema `$id` that was violated.
    pub schema_id: String,
    /// The JSON Pointer to the field that failed validation.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for SchemaValidationDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "schema={}, path={}: {}",
            self.schema_id, self.instance_path, self.message
        )
    }
}

/// Errors returned by schema validation operations.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// An embedded schema could not be parsed. Construction-time only;
    /// indicates a broken build rather than bad input.
    #[error("failed to load schema {name}: {reason}")]
    SchemaLoadError {
        /// Filename of the schema that failed to load.
        name: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The schema could not be compiled into a validator.
    #[error("failed to compile schema {schema_id}: {reason}")]
    SchemaCompileError {
        /// The schema `$id`.
        schema_id: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The document failed validation against its schema.
    #[error("{count} validation error(s) against {schema_id}")]
    ValidationFailed {
        /// The schema that was violated.
        schema_id: String,
        /// Number of violations found.
        count: usize,
        /// Individual violation details.
        details: Vec<SchemaValidationDetail>,
    },

    /// The requested schema was not found in the registry.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),
}

// ---------------------------------------------------------------------------
// Schema retriever for $ref resolution
// ---------------------------------------------------------------------------

/// Resolves `$ref` URIs by looking up pre-loaded schemas.
struct LocalSchemaRetriever {
    /// Map from full URI to parsed schema JSON.
    schemas: HashMap<String, Value>,
}

impl jsonschema::Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        self.schemas
            .get(uri_str)
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri_str}").into())
    }
}

// ---------------------------------------------------------------------------
// SchemaValidator
// ---------------------------------------------------------------------------

/// Validates package documents against the embedded schema corpus.
pub struct SchemaValidator {
    /// Pre-loaded schemas indexed by their `$id` URI.
    schema_map: HashMap<String, Value>,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema_count", &self.schema_map.len())
            .finish()
    }
}

impl SchemaValidator {
    /// Build a validator over the embedded schema set.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::SchemaLoadError`] if an embedded
    /// schema is not valid JSON — possible only with a corrupted build.
    pub fn builtin() -> Result<Self, SchemaValidationError> {
        let mut schema_map = HashMap::new();
        for (name, content) in BUILTIN_SCHEMAS {
            let schema: Value = serde_json::from_str(content).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    name: (*name).to_string(),
                    reason: e.to_string(),
                }
            })?;
            let schema_id = schema
                .get("$id")
                .and_then(|v| v.as_str())
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("{SCHEMA_URI_PREFIX}{name}"));
            schema_map.insert(schema_id, schema);
        }
        Ok(Self { schema_map })
    }

    /// Number of schemas in the registry.
    pub fn schema_count(&self) -> usize {
        self.schema_map.len()
    }

    /// All registered schema `$id` URIs.
    pub fn schema_ids(&self) -> Vec<&str> {
        self.schema_map.keys().map(|s| s.as_str()).collect()
    }

    /// The schema `$id` used for documents of the given layer.
    pub fn schema_id_for(layer: Layer) -> String {
        let name = match layer {
            Layer::Firmware | Layer::Example => "firmware.schema.json",
            _ => "package.schema.json",
        };
        format!("{SCHEMA_URI_PREFIX}{name}")
    }

    /// Validate a document against a schema identified by its `$id` URI.
    ///
    /// Returns `Ok(())` for a valid document, or a
    /// [`SchemaValidationError::ValidationFailed`] carrying every violation.
    pub fn validate_value(
        &self,
        value: &Value,
        schema_id: &str,
    ) -> Result<(), SchemaValidationError> {
        let schema = self
            .schema_map
            .get(schema_id)
            .ok_or_else(|| SchemaValidationError::SchemaNotFound(schema_id.to_string()))?;

        let retriever = LocalSchemaRetriever {
            schemas: self.schema_map.clone(),
        };

        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(retriever)
            .build(schema)
            .map_err(|e| SchemaValidationError::SchemaCompileError {
                schema_id: schema_id.to_string(),
                reason: e.to_string(),
            })?;

        let details: Vec<SchemaValidationDetail> = validator
            .iter_errors(value)
            .map(|err| SchemaValidationDetail {
                schema_id: schema_id.to_string(),
                instance_path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();

        if details.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_id: schema_id.to_string(),
                count: details.len(),
                details,
            })
        }
    }

    /// Validate a document against the schema for its layer.
    pub fn validate_document(
        &self,
        value: &Value,
        layer: Layer,
    ) -> Result<(), SchemaValidationError> {
        self.validate_value(value, &Self::schema_id_for(layer))
    }

    /// Validate a document and render failures as report violations.
    ///
    /// One [`RuleId::SchemaViolation`] per schema error, each carrying the
    /// JSON Pointer of the offending field. Deterministic: the underlying
    /// iterator order is stable for a given document.
    pub fn check_document(&self, rel_path: &Path, value: &Value, layer: Layer) -> Vec<Violation> {
        match self.validate_document(value, layer) {
            Ok(()) => Vec::new(),
            Err(SchemaValidationError::ValidationFailed { details, .. }) => details
                .into_iter()
                .map(|d| {
                    Violation::new(
                        rel_path.to_path_buf(),
                        RuleId::SchemaViolation,
                        format!("{}: {}", d.instance_path, d.message),
                    )
                })
                .collect(),
            Err(other) => vec![Violation::new(
                rel_path.to_path_buf(),
                RuleId::SchemaViolation,
                other.to_string(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> SchemaValidator {
        SchemaValidator::builtin().expect("embedded schemas must load")
    }

    #[test]
    fn builtin_schemas_all_load() {
        let v = validator();
        assert_eq!(v.schema_count(), 3);
        for id in v.schema_ids() {
            assert!(id.starts_with(SCHEMA_URI_PREFIX), "unexpected id: {id}");
        }
    }

    #[test]
    fn layer_to_schema_mapping() {
        assert!(SchemaValidator::schema_id_for(Layer::Base).ends_with("package.schema.json"));
        assert!(SchemaValidator::schema_id_for(Layer::Device).ends_with("package.schema.json"));
        assert!(SchemaValidator::schema_id_for(Layer::Firmware).ends_with("firmware.schema.json"));
        assert!(SchemaValidator::schema_id_for(Layer::Example).ends_with("firmware.schema.json"));
    }

    #[test]
    fn valid_package_document_passes() {
        let doc = json!({
            "substitutions": {"friendly_name": "Device", "log_level": "INFO"},
            "esphome": {"name": "${device_name}"}
        });
        assert!(validator().validate_document(&doc, Layer::Base).is_ok());
    }

    #[test]
    fn non_string_substitution_fails_via_ref() {
        let doc = json!({"substitutions": {"boot_delay": 5}});
        let err = validator()
            .validate_document(&doc, Layer::Base)
            .unwrap_err();
        match err {
            SchemaValidationError::ValidationFailed { count, details, .. } => {
                assert!(count >= 1);
                assert!(details
                    .iter()
                    .any(|d| d.instance_path.contains("boot_delay")));
            }
            other => panic!("expected ValidationFailed, got {other}"),
        }
    }

    #[test]
    fn non_mapping_document_fails() {
        let doc = json!(["not", "a", "mapping"]);
        assert!(validator().validate_document(&doc, Layer::Device).is_err());
    }

    #[test]
    fn project_block_requires_name_and_version() {
        let doc = json!({
            "esphome": {"project": {"name": "acme.relay"}}
        });
        let err = validator()
            .validate_document(&doc, Layer::Firmware)
            .unwrap_err();
        match err {
            SchemaValidationError::ValidationFailed { details, .. } => {
                assert!(details.iter().any(|d| d.message.contains("version")));
            }
            other => panic!("expected ValidationFailed, got {other}"),
        }
    }

    #[test]
    fn dashboard_import_accepts_string_and_mapping() {
        let v = validator();
        let as_string = json!({"dashboard_import": "github://acme/firmware/relay.yaml@main"});
        assert!(v.validate_document(&as_string, Layer::Firmware).is_ok());
        let as_mapping = json!({
            "dashboard_import": {"package_import_url": "github://acme/firmware/relay.yaml@main"}
        });
        assert!(v.validate_document(&as_mapping, Layer::Firmware).is_ok());
        let as_number = json!({"dashboard_import": 42});
        assert!(v.validate_document(&as_number, Layer::Firmware).is_err());
    }

    #[test]
    fn check_document_maps_failures_to_violations() {
        let doc = json!({"substitutions": {"bad": 1, "also_bad": true}});
        let violations =
            validator().check_document(Path::new("common/base.yaml"), &doc, Layer::Base);
        assert_eq!(violations.len(), 2);
        for v in &violations {
            assert_eq!(v.rule, RuleId::SchemaViolation);
            assert_eq!(v.file, Path::new("common/base.yaml"));
        }
    }

    #[test]
    fn check_document_empty_for_valid_input() {
        let doc = json!({"esphome": {}});
        assert!(validator()
            .check_document(Path::new("common/base.yaml"), &doc, Layer::Base)
            .is_empty());
    }

    #[test]
    fn schema_not_found_error() {
        let err = validator()
            .validate_value(&json!({}), "https://packlint.dev/schemas/nope.schema.json")
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::SchemaNotFound(_)));
    }

    #[test]
    fn validation_detail_display() {
        let detail = SchemaValidationDetail {
            schema_id: "https://packlint.dev/schemas/package.schema.json".to_string(),
            instance_path: "/substitutions/boot_delay".to_string(),
            message: "5 is not of type \"string\"".to_string(),
        };
        let s = detail.to_string();
        assert!(s.contains("package.schema.json"));
        assert!(s.contains("/substitutions/boot_delay"));
    }
}
