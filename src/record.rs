//! Field-value records that rules are evaluated against

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, RuleEngineError};

/// A record value: rules only compare integers and strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "integer",
            FieldValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Mapping of field name to value
pub type Record = HashMap<String, FieldValue>;

/// Parse a record from a JSON object such as `{"age": 35, "department": "Sales"}`
pub fn record_from_json(json: &str) -> Result<Record> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    record_from_value(value)
}

/// Convert an already-parsed JSON value into a record
pub fn record_from_value(value: serde_json::Value) -> Result<Record> {
    let serde_json::Value::Object(map) = value else {
        return Err(RuleEngineError::InvalidRecord(
            "user data must be an object".to_string(),
        ));
    };

    let mut record = Record::with_capacity(map.len());
    for (field, value) in map {
        let field_value = match value {
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => {
                    return Err(RuleEngineError::InvalidRecord(format!(
                        "field '{}' must be an integer or string, got {}",
                        field, n
                    )))
                }
            },
            other => {
                return Err(RuleEngineError::InvalidRecord(format!(
                    "field '{}' must be an integer or string, got {}",
                    field, other
                )))
            }
        };
        record.insert(field, field_value);
    }

    Ok(record)
}
