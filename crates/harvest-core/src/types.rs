//! Shared types used across the catalog sweep.
//!
//! This module defines the filter values that make up a parameter set and the
//! identity-carrying record type produced by the fetchers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the field every catalog record is keyed by.
pub const RECORD_ID_FIELD: &str = "id";

/// One selectable value of a filter dimension.
///
/// In TOML a value is written as a string, an integer or an array of
/// strings. The "no constraint" value is not written as a value at all; see
/// `DimensionConfig::unconstrained` in the config module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// No constraint on this dimension; omitted from the query string.
    #[serde(skip)]
    Unconstrained,
    /// Integer value, e.g. `time_on_foot__lte=10`
    Integer(i64),
    /// Plain text value, e.g. `rooms=st`
    Text(String),
    /// Multi-valued; the key is repeated once per element.
    List(Vec<String>),
}

impl FilterValue {
    /// Shorthand for a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Shorthand for a list value.
    #[must_use]
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Whether this is the "no constraint" sentinel.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Unconstrained)
    }

    /// Append the `key=value` pairs this value contributes to a query string.
    pub fn append_query_pairs(&self, key: &str, pairs: &mut Vec<(String, String)>) {
        match self {
            Self::Unconstrained => {}
            Self::Integer(n) => pairs.push((key.to_string(), n.to_string())),
            Self::Text(s) => pairs.push((key.to_string(), s.clone())),
            Self::List(items) => {
                pairs.extend(items.iter().map(|item| (key.to_string(), item.clone())));
            }
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => write!(f, "*"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "[{}]", items.join(",")),
        }
    }
}

/// Identity of a catalog record.
///
/// The API returns ids as JSON numbers, but strings are accepted too. An
/// integer id and a string id never compare equal, even if they print the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    /// Numeric id
    Integer(i64),
    /// String id, or a number outside the `i64` range
    Text(String),
}

impl RecordId {
    /// Extract an id from a JSON value, if it has a usable shape.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Self::Text(n.to_string()), Self::Integer),
            ),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// An opaque catalog record, keyed by its `id` field.
///
/// Serializes as the original JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    #[serde(skip)]
    id: RecordId,
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a JSON item.
    ///
    /// Returns `None` when the item is not an object or lacks a usable `id`.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let id = fields.get(RECORD_ID_FIELD).and_then(RecordId::from_value)?;
        Some(Self { id, fields })
    }

    /// The record identity.
    #[must_use]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// All fields, including `id`, in response order.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}
