//! JSON Schema validation of message bodies.
//!
//! Provides schema-based validation for message payloads so consumers can
//! reject malformed input before it reaches application logic. Validation
//! failures share the error-queue path with every other processing failure.

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{Draft, JSONSchema, ValidationError};
use mq_client::ReceivedMessage;
use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Invalid JSON Schema definition
#[derive(Debug, Clone, Error)]
#[error("invalid JSON Schema: {reason}")]
pub struct SchemaError {
    pub reason: String,
}

/// A message body that failed validation
#[derive(Debug, Error)]
pub enum ValidationFailure {
    /// Body could not be parsed as JSON at all
    #[error("message body is not valid JSON: {reason}")]
    Parse { reason: String },

    /// Body parsed but does not conform to the schema
    #[error("message does not conform to schema: {}", violations.join("; "))]
    Conformance {
        violations: Vec<String>,
        /// The offending parsed value
        value: Value,
    },
}

/// Compiled message-body validator
///
/// The schema is compiled once per validator lifetime; validation itself is
/// pure and cheap enough to run per message.
pub struct SchemaValidator {
    schema: JSONSchema,
}

impl SchemaValidator {
    /// Compile a draft-07 JSON Schema document
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| SchemaError {
                reason: e.to_string(),
            })?;

        Ok(Self { schema: compiled })
    }

    /// Validate a message body against the schema
    ///
    /// Returns the parsed value on success so callers do not parse twice.
    pub fn validate(&self, message: &ReceivedMessage) -> Result<Value, ValidationFailure> {
        let value: Value =
            serde_json::from_str(message.body()).map_err(|e| ValidationFailure::Parse {
                reason: e.to_string(),
            })?;

        let violations: Vec<String> = match self.schema.validate(&value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| describe_violation(&e)).collect(),
        };

        if violations.is_empty() {
            Ok(value)
        } else {
            Err(ValidationFailure::Conformance { violations, value })
        }
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

/// Render one validation error as a machine-matchable diagnostic
///
/// Type mismatches use the established "does not match any allowed primitive
/// type" phrasing so downstream error consumers can match on it.
fn describe_violation(error: &ValidationError<'_>) -> String {
    match &error.kind {
        ValidationErrorKind::Type { kind } => {
            let allowed = match kind {
                TypeKind::Single(primitive) => primitive.to_string(),
                TypeKind::Multiple(primitives) => {
                    let mut names: Vec<String> = primitives
                        .clone()
                        .into_iter()
                        .map(|p| p.to_string())
                        .collect();
                    names.sort();
                    names.join(", ")
                }
            };
            format!(
                "instance type ({}) does not match any allowed primitive type (allowed: [{}])",
                json_type_name(error.instance.as_ref()),
                allowed
            )
        }
        _ => format!("property '{}': {}", error.instance_path, error),
    }
}

/// Name the JSON type of a value the way schema diagnostics do
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
