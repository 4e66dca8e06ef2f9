//! Conformance check for structured output.
//!
//! Supports the subset of JSON Schema that structured-output schemas use:
//! `type` (a name or a list of names), `properties`, `required`,
//! `additionalProperties: false`, `items` and `enum`. Unknown keywords are
//! ignored.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct SchemaViolation {
    /// Location of the offending value, `$` being the root
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Check `value` against `schema`, reporting the first violation.
pub fn validate(value: &Value, schema: &Value) -> Result<(), SchemaViolation> {
    check(value, schema, "$")
}

fn check(value: &Value, schema: &Value, path: &str) -> Result<(), SchemaViolation> {
    let Some(schema) = schema.as_object() else {
        // `true`, `{}` and anything unexpected accept every value
        return Ok(());
    };

    if let Some(expected) = schema.get("type") {
        check_type(value, expected, path)?;
    }

    if let Some(Value::Array(allowed)) = schema.get("enum") {
        if !allowed.contains(value) {
            return Err(SchemaViolation::new(
                path,
                format!("{value} is not one of the allowed values"),
            ));
        }
    }

    match value {
        Value::Object(object) => check_object(object, schema, path),
        Value::Array(items) => {
            let Some(item_schema) = schema.get("items") else {
                return Ok(());
            };
            for (index, item) in items.iter().enumerate() {
                check(item, item_schema, &format!("{path}[{index}]"))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_object(
    object: &Map<String, Value>,
    schema: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaViolation> {
    if let Some(Value::Array(required)) = schema.get("required") {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                return Err(SchemaViolation::new(
                    path,
                    format!("missing required field '{field}'"),
                ));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let closed = matches!(schema.get("additionalProperties"), Some(Value::Bool(false)));

    for (key, field_value) in object {
        let field_path = format!("{path}.{key}");
        match properties.and_then(|properties| properties.get(key)) {
            Some(field_schema) => check(field_value, field_schema, &field_path)?,
            None if closed => {
                return Err(SchemaViolation::new(&field_path, "field is not allowed"));
            }
            None => {}
        }
    }
    Ok(())
}

fn check_type(value: &Value, expected: &Value, path: &str) -> Result<(), SchemaViolation> {
    let accepted = match expected {
        Value::String(name) => matches_type(value, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type(value, name)),
        _ => true,
    };
    if accepted {
        Ok(())
    } else {
        Err(SchemaViolation::new(
            path,
            format!("expected {expected}, found {}", type_name(value)),
        ))
    }
}

fn matches_type(value: &Value, name: &str) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(number) => {
                number.is_i64()
                    || number.is_u64()
                    || number.as_f64().is_some_and(|float| float.fract() == 0.0)
            }
            _ => false,
        },
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
