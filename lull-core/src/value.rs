//! Node parameter values.
//!
//! Hosts hand parameters to nodes in whatever shape their configuration layer
//! produced: plain JSON/YAML scalars, or already-constructed date values. A
//! [`ParamValue`] keeps those shapes apart so a node can tell "a string that
//! may contain a date" from "an instant the host already resolved".

use crate::error::{LullError, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::{Number, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;

/// A single node parameter as supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Explicit null.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Numeric value (integer or float).
    Number(Number),
    /// Free-form text.
    String(String),
    /// A native absolute instant.
    Date(DateTime<Utc>),
    /// A rich date-time that carries its own UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Anything structured (arrays, objects) the node does not interpret.
    Json(JsonValue),
}

impl ParamValue {
    /// Create a string value.
    pub fn string(v: impl Into<String>) -> Self {
        Self::String(v.into())
    }

    /// Create an integer value.
    pub fn int(v: i64) -> Self {
        Self::Number(v.into())
    }

    /// Create a floating-point value. Non-finite input becomes `Null`.
    pub fn float(v: f64) -> Self {
        Number::from_f64(v).map_or(Self::Null, Self::Number)
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get a boolean, accepting `"true"`/`"false"` strings as well.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get the value as an f64 if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get the value as a whole number.
    ///
    /// Floats are accepted only when they have no fractional part, so `60.0`
    /// yields `60` while `0.5` yields `None`.
    pub fn as_integer(&self) -> Option<i64> {
        if let Self::Number(n) = self {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
        }
        let f = self.as_f64()?;
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }

    /// Short name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Json(_) => "json",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::DateTime(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<JsonValue> for ParamValue {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => Self::Number(n),
            JsonValue::String(s) => Self::String(s),
            other => Self::Json(other),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::float(v)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<DateTime<FixedOffset>> for ParamValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::DateTime(v)
    }
}

/// Named parameters for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeParameters {
    values: HashMap<String, ParamValue>,
}

impl NodeParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Layer `other` on top of `self`; entries in `other` win.
    pub fn overlay(&mut self, other: &NodeParameters) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Build parameters from a JSON object.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self {
                values: map
                    .into_iter()
                    .map(|(k, v)| (k, ParamValue::from(v)))
                    .collect(),
            }),
            JsonValue::Null => Ok(Self::new()),
            other => Err(LullError::ConfigValue {
                field: "config".to_string(),
                cause: format!("expected a mapping of parameters, got {other}"),
            }),
        }
    }

    /// Build parameters from a YAML `config:` block.
    pub fn from_yaml(value: &serde_yaml::Value) -> Result<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| LullError::Serialization(format!("Failed to convert config: {e}")))?;
        Self::from_json(json)
    }
}
