//! Property values
//!
//! Tagged value union and single/multi-valued property wrapper.

use crate::id::NodeId;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

/// A single property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// UTF-8 string
    String(String),
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// Timestamp with explicit offset
    Date(DateTime<FixedOffset>),
    /// Reference to another node
    Reference(NodeId),
}

impl Value {
    /// Render the value as a string
    ///
    /// Dates render as ISO-8601 with millisecond precision and explicit
    /// offset; references render as the hyphenated identifier.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, false),
            Value::Reference(id) => id.to_string(),
        }
    }

    /// String contents, if this is a string value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A property: one value or an ordered sequence of values
///
/// Insertion order of multi-valued properties is significant and preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Exactly one value
    Single(Value),
    /// Ordered sequence of values
    Multi(Vec<Value>),
}

impl PropertyValue {
    /// Single string property
    #[inline]
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::Single(Value::String(s.into()))
    }

    /// Multi-valued string property
    #[inline]
    #[must_use]
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multi(values.into_iter().map(|s| Value::String(s.into())).collect())
    }

    /// Check if the property carries multiple values
    #[inline]
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// All values in order (a single value yields a one-element slice)
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multi(vs) => vs.as_slice(),
        }
    }

    /// First value, if any
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.values().first()
    }

    /// Number of values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Check for an empty multi-valued property
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Render every value in order
    #[must_use]
    pub fn render_all(&self) -> Vec<String> {
        self.values().iter().map(Value::render).collect()
    }
}
