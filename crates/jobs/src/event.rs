//! Null-safe access to untyped event payloads.
//!
//! Webhook bodies and bus messages arrive with no schema guarantees. Every
//! lookup here walks a chain of keys and short-circuits to `None` the moment a
//! key is missing or an intermediate value is not an object, so a malformed
//! payload can only ever turn into "no match", never a panic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound event payload exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Value);

impl RawEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// `true` for `null` and for an object, array, or string with no content.
    pub fn is_empty(&self) -> bool {
        !is_truthy(&self.0)
    }

    /// Walks `path` through nested objects.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        nested_get(&self.0, path)
    }

    /// Returns the non-empty string found at `path`.
    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.get(path)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns the non-negative integer found at `path`.
    pub fn u64_at(&self, path: &[&str]) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    /// `true` when a value exists at `path` and is not empty, zero, `false`, or `null`.
    pub fn is_truthy_at(&self, path: &[&str]) -> bool {
        self.get(path).is_some_and(is_truthy)
    }
}

impl From<Value> for RawEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Walks `path` through nested objects starting at `value`.
///
/// An empty path returns `value` itself.
pub fn nested_get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Whether a payload value counts as "present" for matching purposes.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
