//! Schema-free access to webhook payloads.
//!
//! Upstream payloads are large, vary per event type and action, and change
//! over time. Formatters read them through dotted paths (`pull_request.user.login`,
//! `commits.0.id`) that resolve to a default instead of failing when any step
//! is missing or has the wrong type.

use serde_json::Value;

/// Placeholder rendered for text fields missing from a payload.
pub const MISSING_FIELD_PLACEHOLDER: &str = "unknown";

/// Owned webhook payload document.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(Value);

impl Payload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrowed view over the document root.
    pub fn view(&self) -> PayloadView<'_> {
        PayloadView(&self.0)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// True for `null`, an empty object or an empty array.
    pub fn is_absent(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.view().get(path).map(|view| view.0)
    }

    pub fn text(&self, path: &str) -> Option<String> {
        self.view().text(path)
    }

    pub fn text_or(&self, path: &str, default: &str) -> String {
        self.view().text_or(path, default)
    }

    pub fn text_or_unknown(&self, path: &str) -> String {
        self.view().text_or_unknown(path)
    }

    pub fn flag(&self, path: &str) -> bool {
        self.view().flag(path)
    }

    pub fn items(&self, path: &str) -> Vec<PayloadView<'_>> {
        self.view().items(path)
    }

    pub fn has(&self, path: &str) -> bool {
        self.view().has(path)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Borrowed node inside a [`Payload`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadView<'a>(&'a Value);

impl<'a> PayloadView<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &'a Value {
        self.0
    }

    /// Resolve a dotted path. Numeric segments index into arrays.
    ///
    /// An empty path resolves to the node itself.
    pub fn get(&self, path: &str) -> Option<PayloadView<'a>> {
        let mut current = self.0;
        for segment in path.split('.').filter(|segment| !segment.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(PayloadView(current))
    }

    /// Scalar at `path` rendered as text.
    ///
    /// Strings are returned as-is, numbers and booleans are stringified.
    /// Null, objects, arrays and missing keys yield `None`.
    pub fn text(&self, path: &str) -> Option<String> {
        match self.get(path)?.0 {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    /// Like [`text`](Self::text), falling back to `default` when absent or empty.
    pub fn text_or(&self, path: &str, default: &str) -> String {
        self.text(path)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn text_or_unknown(&self, path: &str) -> String {
        self.text_or(path, MISSING_FIELD_PLACEHOLDER)
    }

    /// Boolean at `path`; anything other than `true` reads as `false`.
    pub fn flag(&self, path: &str) -> bool {
        matches!(self.get(path).map(|view| view.0), Some(Value::Bool(true)))
    }

    /// Elements of the array at `path`, or nothing when it is not an array.
    pub fn items(&self, path: &str) -> Vec<PayloadView<'a>> {
        match self.get(path).map(|view| view.0) {
            Some(Value::Array(items)) => items.iter().map(PayloadView).collect(),
            _ => Vec::new(),
        }
    }

    /// True when `path` resolves to a non-null, non-empty value.
    pub fn has(&self, path: &str) -> bool {
        match self.get(path).map(|view| view.0) {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(value)) => !value.is_empty(),
            Some(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
