//! JSON payload field extraction
//!
//! Absent fields are `None`. A present field must hold a usable value:
//! `null`, empty strings and values of the wrong type are rejected.
//! Strings are percent-decoded the same way as query text.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{Result, WayfarerError};
use crate::protocol::decode_component;

/// A decoded POST body (always a JSON object)
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn parse(body: &[u8]) -> Result<Self> {
        match serde_json::from_slice(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(_) => Err(WayfarerError::malformed("payload is not a JSON object")),
            Err(e) => Err(WayfarerError::malformed(format!("invalid JSON payload: {}", e))),
        }
    }

    /// Integer field; accepts JSON integers and numeric strings
    pub fn int<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: TryFrom<i64> + FromStr,
    {
        let parsed = match self.fields.get(key) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_i64().and_then(|v| T::try_from(v).ok()),
            Some(Value::String(s)) => s.parse().ok(),
            Some(_) => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| WayfarerError::invalid(format!("invalid value for {}", key)))
    }

    /// String field, percent-decoded with `+` as a space
    ///
    /// Length limits apply to the decoded value.
    pub fn text(&self, key: &str) -> Result<Option<String>> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if !s.is_empty() => Ok(Some(decode_component(s))),
            Some(_) => Err(WayfarerError::invalid(format!("invalid value for {}", key))),
        }
    }
}

/// Turn an absent field into a validation failure
pub fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| WayfarerError::invalid(format!("missing field {}", key)))
}
