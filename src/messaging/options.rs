//! # Transport Options
//!
//! Caller-supplied option bag for one transport, and the filtered view of it
//! that executors receive. Reserved routing keys such as `transport_name` are
//! removed in exactly one place, [`TransportOptions::for_executor`], so an
//! [`ExecutorOptions`] value can never carry them.

use crate::constants::options::{ENTITIES, RESERVED, TRANSPORT_NAME};
use crate::error::{TransportError, TransportResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options as supplied for a transport, reserved keys included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportOptions(Map<String, Value>);

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; any other JSON type is rejected.
    pub fn from_value(value: Value) -> TransportResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TransportError::configuration(
                "TransportOptions",
                format!("options must be a JSON object, got {other}"),
            )),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `entities` holds a non-empty list, map or name.
    pub fn has_entities(&self) -> bool {
        match self.0.get(ENTITIES) {
            Some(Value::Array(entities)) => !entities.is_empty(),
            Some(Value::Object(entities)) => !entities.is_empty(),
            Some(Value::String(entity)) => !entity.is_empty(),
            _ => false,
        }
    }

    pub fn transport_name(&self) -> Option<&str> {
        self.0.get(TRANSPORT_NAME).and_then(Value::as_str)
    }

    /// Options with every reserved key removed.
    pub fn for_executor(&self) -> ExecutorOptions {
        let filtered = self
            .0
            .iter()
            .filter(|(key, _)| !RESERVED.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        ExecutorOptions(filtered)
    }
}

impl From<Map<String, Value>> for TransportOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Options as seen by an executor. Only obtainable through
/// [`TransportOptions::for_executor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExecutorOptions(Map<String, Value>);

impl ExecutorOptions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn entities(&self) -> Option<&Value> {
        self.0.get(ENTITIES)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Stable identity of these options: compact JSON with object keys
    /// sorted at every depth, so key insertion order never matters and
    /// distinct option sets never collide.
    pub fn fingerprint(&self) -> String {
        canonical(&Value::Object(self.0.clone())).to_string()
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), canonical(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}
