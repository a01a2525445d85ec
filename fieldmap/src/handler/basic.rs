//! Scalars and null.

use serde_json::Value;

use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::TypeHandler;
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::FieldValue;

/// Passes scalars through and casts incoming scalars to the declared type.
///
/// Casting is lenient: `"12"` becomes `12` for an int field, `12` becomes
/// `"12"` for a string field and `"yes"`/`"on"`/`"true"`/`"1"` are true for
/// a bool field.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicHandler;

impl BasicHandler {
    pub const ID: &'static str = "basic";
}

impl TypeHandler for BasicHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        10
    }

    fn supports_serialize(&self, value: &FieldValue) -> bool {
        value.is_null() || value.is_scalar()
    }

    fn supports_deserialize(&self, value: &Value, ty: &TypeRef) -> bool {
        value.is_null() || ty.is_basic()
    }

    fn supports_describe(&self, _name: &str, metadata: &FieldMetadata) -> bool {
        metadata.runtime_type.is_basic()
    }

    fn serialize(
        &self,
        value: &FieldValue,
        _metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Value> {
        value.to_json()
    }

    fn deserialize(
        &self,
        value: Value,
        metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<FieldValue> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        cast(value, &metadata.runtime_type)
    }
}

/// Cast a scalar JSON value to a basic type.
pub fn cast(value: Value, ty: &TypeRef) -> Result<FieldValue> {
    let cast_error = |value: &Value| {
        SerializerError::deserialization(format!(
            "Cannot cast {} to {}.",
            json_label(value),
            ty.name()
        ))
    };

    match ty {
        TypeRef::String => match value {
            Value::String(text) => Ok(FieldValue::String(text)),
            Value::Bool(flag) => Ok(FieldValue::String(if flag { "1" } else { "" }.to_owned())),
            Value::Number(number) => Ok(FieldValue::String(match number.as_i64() {
                Some(int) => int.to_string(),
                None => format_float(number.as_f64().unwrap_or_default()),
            })),
            other => Err(cast_error(&other)),
        },
        TypeRef::Int => match &value {
            Value::Number(number) => Ok(FieldValue::Int(
                number
                    .as_i64()
                    .unwrap_or_else(|| number.as_f64().unwrap_or_default() as i64),
            )),
            Value::String(text) => Ok(FieldValue::Int(leading_float(text) as i64)),
            Value::Bool(flag) => Ok(FieldValue::Int(i64::from(*flag))),
            _ => Err(cast_error(&value)),
        },
        TypeRef::Float => match &value {
            Value::Number(number) => Ok(FieldValue::Float(number.as_f64().unwrap_or_default())),
            Value::String(text) => Ok(FieldValue::Float(leading_float(text))),
            Value::Bool(flag) => Ok(FieldValue::Float(if *flag { 1.0 } else { 0.0 })),
            _ => Err(cast_error(&value)),
        },
        TypeRef::Bool => match &value {
            Value::Bool(flag) => Ok(FieldValue::Bool(*flag)),
            Value::String(text) => Ok(FieldValue::Bool(is_truthy(text))),
            Value::Number(number) => Ok(FieldValue::Bool(number.as_f64() == Some(1.0))),
            _ => Err(cast_error(&value)),
        },
        _ => Ok(FieldValue::from_json(value)),
    }
}

/// `1`, `true`, `on` and `yes`, case-insensitive and ignoring surrounding
/// whitespace.
pub fn is_truthy(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// The numeric prefix of `text`, `0` when there is none.
fn leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exponent = false;

    for (index, c) in text.char_indices() {
        match c {
            '+' | '-' if index == 0 => {}
            '+' | '-' if seen_exponent && text[..index].ends_with(['e', 'E']) => {}
            '0'..='9' => {
                seen_digit = true;
                end = index + 1;
                continue;
            }
            '.' if !seen_dot && !seen_exponent => seen_dot = true,
            'e' | 'E' if seen_digit && !seen_exponent => seen_exponent = true,
            _ => break,
        }
    }

    text[..end].parse().unwrap_or_default()
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn json_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
