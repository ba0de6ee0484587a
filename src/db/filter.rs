//! Exact-match metadata filters.
//!
//! A [`MetadataFilter`] is a conjunction of `metadata.<key> == value`
//! conditions. Only scalar string, integer and boolean values can be matched;
//! anything else is rejected when the filter is validated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AppError, Metadata, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    conditions: Vec<(String, Value)>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition on `key`.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    /// Build a filter from every entry of a metadata map.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            conditions: metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Parse a `key=value` pair as typed on the command line.
    ///
    /// `true`/`false` become booleans, integral text becomes an integer and
    /// everything else stays a string.
    pub fn parse_condition(raw: &str) -> Result<(String, Value)> {
        let (key, value) = raw.split_once('=').ok_or_else(|| {
            AppError::InvalidInput(format!("filter '{}' must look like key=value", raw))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "filter '{}' has an empty key",
                raw
            )));
        }

        let value = value.trim();
        let value = match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => match other.parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(other.to_string()),
            },
        };

        Ok((key.to_string(), value))
    }

    /// Parse several `key=value` pairs into one filter.
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let mut filter = Self::new();
        for item in raw {
            let (key, value) = Self::parse_condition(item.as_ref())?;
            filter = filter.eq(key, value);
        }
        Ok(filter)
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Reject values that cannot be expressed as exact-match conditions.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in &self.conditions {
            match value {
                Value::String(_) | Value::Bool(_) => {}
                Value::Number(n) if n.is_i64() || n.is_u64() => {}
                other => {
                    return Err(AppError::VectorStore(format!(
                        "unsupported filter value for '{}': {} (expected string, integer or boolean)",
                        key, other
                    )))
                }
            }
        }
        Ok(())
    }

    /// True when every condition equals the corresponding metadata entry.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }
}
