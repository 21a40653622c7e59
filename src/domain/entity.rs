//! Entity and per-entity result types
//!
//! An entity is one record of an inbound batch. It is kept as an untyped JSON
//! object because the relay never interprets its fields beyond the id, the
//! payload property and the override property.

use serde_json::{Map, Value};
use std::fmt;

/// One record of the batch
pub type Entity = Map<String, Value>;

/// Returns the entity's `_id` for diagnostics, or `"?"` when absent
pub fn entity_id(entity: &Entity) -> String {
    match entity.get("_id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

/// Normalized outcome of one outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    /// HTTP status code, or 500 for transport and render failures
    pub status_code: u16,

    /// Parsed JSON body, raw text body, or a failure description
    pub return_value: Value,
}

impl TransformResult {
    /// Creates a successful result
    pub fn new(status_code: u16, return_value: Value) -> Self {
        Self {
            status_code,
            return_value,
        }
    }

    /// Creates a failure result with the standard failure payload
    pub fn failure(status_code: u16, message: impl AsRef<str>) -> Self {
        Self {
            status_code,
            return_value: super::errors::failure_body(message.as_ref(), status_code),
        }
    }

    /// Whether the status counts as a successful response (below 400)
    pub fn is_ok(&self) -> bool {
        is_ok_status(self.status_code)
    }
}

/// The legacy client's notion of success: a 2xx or 3xx status
pub fn is_ok_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

/// Endpoint behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMode {
    /// Write each call's result into the entity
    Transform,
    /// Only confirm delivery; entities pass through unmodified
    Sink,
}

impl fmt::Display for EndpointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointMode::Transform => write!(f, "transform"),
            EndpointMode::Sink => write!(f, "sink"),
        }
    }
}
