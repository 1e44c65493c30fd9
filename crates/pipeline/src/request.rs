//! Inbound request parameters.
//!
//! The pipeline only ever asks two things of a request: "is this key present"
//! and, inside a stage, "what is the value for this key". Values are kept as
//! strings; stages convert them and report `InvalidFilterValue` on failure.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Flat mapping of parameter names to values.
///
/// Later inserts of the same key replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams {
    values: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a URL query string such as `name=ann&age=18%2C30`.
    ///
    /// A leading `?` is ignored. Keys without a value (`?verified`) are
    /// present with an empty value.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Build from a flat JSON object.
    ///
    /// Strings are taken as-is, numbers and booleans are stringified and
    /// `null` means absent. Nested arrays or objects are rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            PipelineError::MalformedRequest("expected a JSON object".to_string())
        })?;

        let mut params = Self::new();
        for (key, value) in object {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(PipelineError::MalformedRequest(format!(
                        "parameter '{key}' must be a string, number or boolean"
                    )));
                }
            };
            params.insert(key.clone(), text);
        }
        Ok(params)
    }

    /// Insert a parameter, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or `InvalidFilterValue` when it is missing.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| PipelineError::invalid_value(key, "", "parameter is missing"))
    }

    /// Parse the value for `key`.
    ///
    /// # Returns
    /// * `Ok(None)` - the key is absent
    /// * `Ok(Some(v))` - the key is present and parsed
    /// * `Err(InvalidFilterValue)` - the key is present but unparsable
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                PipelineError::invalid_value(
                    key,
                    raw,
                    format!("expected {}", std::any::type_name::<T>()),
                )
            }),
        }
    }

    /// Parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
