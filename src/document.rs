//! Whole-document helpers over JSON text: parsing, pretty printing,
//! validation and a few reshaping utilities.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{Error, Result};

pub fn parse(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Pretty print with `indent` spaces per level.
pub fn format(text: &str, indent: usize) -> Result<String> {
    to_pretty(&parse(text)?, indent)
}

pub fn to_pretty(value: &Value, indent: usize) -> Result<String> {
    let pad = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(Error::Serialize)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn compact(text: &str) -> Result<String> {
    serde_json::to_string(&parse(text)?).map_err(Error::Serialize)
}

/// Two-space pretty JSON for any serializable report. Fails on shapes JSON
/// cannot hold, such as maps with non-string keys.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Error::Serialize)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 1-based position of the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

pub fn validate(text: &str) -> Validation {
    match serde_json::from_str::<Value>(text) {
        Ok(_) => Validation {
            valid: true,
            error: None,
            line: None,
            column: None,
        },
        Err(e) => Validation {
            valid: false,
            error: Some(e.to_string()),
            line: Some(e.line()),
            column: Some(e.column()),
        },
    }
}

/// `null`, `boolean`, `number`, `string`, `array` or `object`.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeInfo {
    pub bytes: usize,
    pub lines: usize,
    pub label: String,
}

pub fn size_info(text: &str) -> SizeInfo {
    let bytes = text.len();
    let lines = text.split('\n').count();
    let label = if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    };
    SizeInfo {
        bytes,
        lines,
        label,
    }
}

/// Nested objects collapse into `a.b.c` keys. Arrays and scalars are leaves.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    if let Value::Object(map) = value {
        flatten_into(map, "", &mut out);
    }
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Map<String, Value>) {
    for (key, v) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match v {
            Value::Object(inner) => flatten_into(inner, &name, out),
            leaf => {
                out.insert(name, leaf.clone());
            }
        }
    }
}

/// Recursively sorts object keys. Array order is kept.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}
