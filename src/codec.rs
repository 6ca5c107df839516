//! Value codec: serialize grain state to and from its stored text form.
//!
//! The store treats values as opaque `serde_json::Value`s; the codec decides
//! the persisted encoding. `JsonStateCodec` is the default implementation,
//! configurable in the same places the store's callers historically expect:
//! how much type metadata to embed, whether embedded type names are fully
//! qualified, pretty-printing, and the field-naming strategy applied to
//! persisted keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// How much type metadata to embed in the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeNameHandling {
    /// No type metadata is written (default).
    #[default]
    None,
    /// Wrap every value as `{"$type": <tag>, "$value": <state>}`.
    All,
}

/// Field-naming strategy applied to persisted object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldNaming {
    /// Keys are persisted exactly as the caller supplied them (default).
    #[default]
    Preserve,
    /// Keys are converted from snake_case to camelCase on encode.
    CamelCase,
}

/// Configuration for [`JsonStateCodec`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonCodecOptions {
    pub type_name_handling: TypeNameHandling,
    /// Qualify embedded type tags with the service id (`"{service_id}.{tag}"`).
    pub use_full_type_names: bool,
    /// Pretty-print the persisted JSON.
    pub indent_output: bool,
    pub field_naming: FieldNaming,
}

/// Error type for codec operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    Encode(String),
    Decode(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Encode(msg) => write!(f, "state encode failed: {}", msg),
            CodecError::Decode(msg) => write!(f, "state decode failed: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

/// Serialize and deserialize an opaque grain-state value.
pub trait StateCodec: Send + Sync {
    /// Encode a value for storage. `type_tag` is the grain-type tag of the
    /// value being persisted, used when type metadata embedding is enabled.
    fn encode(&self, type_tag: &str, state: &Value) -> Result<String, CodecError>;

    /// Decode a stored string back into a value.
    fn decode(&self, raw: &str) -> Result<Value, CodecError>;
}

/// JSON codec over `serde_json`.
pub struct JsonStateCodec {
    service_id: String,
    options: JsonCodecOptions,
}

impl JsonStateCodec {
    pub fn new(service_id: impl Into<String>, options: JsonCodecOptions) -> Self {
        JsonStateCodec {
            service_id: service_id.into(),
            options,
        }
    }

    fn embedded_tag(&self, type_tag: &str) -> String {
        if self.options.use_full_type_names {
            format!("{}.{}", self.service_id, type_tag)
        } else {
            type_tag.to_string()
        }
    }
}

impl StateCodec for JsonStateCodec {
    fn encode(&self, type_tag: &str, state: &Value) -> Result<String, CodecError> {
        let mut value = state.clone();
        if self.options.field_naming == FieldNaming::CamelCase {
            value = rename_keys(value);
        }
        if self.options.type_name_handling == TypeNameHandling::All {
            value = json!({ "$type": self.embedded_tag(type_tag), "$value": value });
        }
        let encoded = if self.options.indent_output {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        encoded.map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, raw: &str) -> Result<Value, CodecError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| CodecError::Decode(e.to_string()))?;
        if self.options.type_name_handling == TypeNameHandling::All {
            if let Value::Object(mut map) = value {
                return match map.remove("$value") {
                    Some(inner) => Ok(inner),
                    None => Err(CodecError::Decode(
                        "type-tagged payload is missing the $value field".to_string(),
                    )),
                };
            }
            return Err(CodecError::Decode(
                "type-tagged payload is not an object".to_string(),
            ));
        }
        Ok(value)
    }
}

/// Recursively convert object keys from snake_case to camelCase.
///
/// Applied on encode only; decode returns keys as persisted, since the
/// conversion is not reversible in general.
fn rename_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let renamed: Map<String, Value> = map
                .into_iter()
                .map(|(key, inner)| (to_camel_case(&key), rename_keys(inner)))
                .collect();
            Value::Object(renamed)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(rename_keys).collect()),
        other => other,
    }
}

fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
