//! The options dictionary a transport is configured with.
//!
//! # Design
//! Options are a JSON object so headers, auth material and client settings
//! from different sources can be combined without a fixed schema. Sources are
//! combined with a deep merge in which arrays concatenate instead of being
//! replaced, so a header list contributed by one source is never lost to
//! another.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a request is for. Each action has its own options section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Fetch a resource (`get`).
    Read,
    /// Probe that a resource exists (`ping`).
    Exists,
}

impl Action {
    pub fn key(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Exists => "exists",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. Anything but an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Deep-merge `other` on top of `self`.
    ///
    /// Objects merge key by key, arrays concatenate, and any other collision
    /// is won by `other`.
    pub fn merge(mut self, other: Options) -> Options {
        merge_maps(&mut self.0, other.0);
        self
    }

    /// Merge every source in order, later sources on top.
    pub fn merge_all(sources: impl IntoIterator<Item = Options>) -> Options {
        sources.into_iter().fold(Options::new(), Options::merge)
    }

    /// Request headers for `action`.
    ///
    /// Top-level `headers` apply to every action; the action section's
    /// `headers` replace same-named (case-insensitive) top-level ones.
    pub fn headers_for(&self, action: Action) -> Vec<(String, String)> {
        let mut headers = header_lines(self.0.get("headers"));
        let section = self
            .0
            .get(action.key())
            .and_then(|section| section.get("headers"));
        let overrides = header_lines(section);

        headers.retain(|(name, _)| {
            !overrides
                .iter()
                .any(|(other, _)| other.eq_ignore_ascii_case(name))
        });
        headers.extend(overrides);
        headers
    }
}

fn merge_maps(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, incoming) in source {
        match target.get_mut(&key) {
            Some(existing) => merge_values(existing, incoming),
            None => {
                target.insert(key, incoming);
            }
        }
    }
}

fn merge_values(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(target), Value::Object(source)) => merge_maps(target, source),
        (Value::Array(target), Value::Array(source)) => target.extend(source),
        (slot, incoming) => *slot = incoming,
    }
}

/// Flatten a `headers` object into header lines. Arrays give one line per
/// element; nulls and nested objects are skipped.
fn header_lines(headers: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = headers else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (name, value) in map {
        match value {
            Value::Array(values) => {
                lines.extend(values.iter().filter_map(render).map(|v| (name.clone(), v)));
            }
            other => {
                if let Some(v) = render(other) {
                    lines.push((name.clone(), v));
                }
            }
        }
    }
    lines
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
