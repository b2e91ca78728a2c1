use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// A single violation recorded on a result node.
///
/// Errors are plain data: two errors with the same key are still distinct
/// entries, and a node may hold any number of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Error {
    /// Message key the rule declared (e.g. `empty`, `too_low`).
    pub key: String,
    /// Rendered (translated and interpolated) message.
    pub message: String,
    /// The value the rule was looking at when the violation was found.
    pub value: Value,
    /// Snapshot of the caller-supplied context values (locale etc.).
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    /// Critical errors mean the converted value is unusable.
    pub is_critical: bool,
    /// Rule-specific named attributes, usually the message parameters.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl Error {
    /// Create a critical error without context or details.
    pub fn new(key: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            value,
            context: Map::new(),
            is_critical: true,
            details: Map::new(),
        }
    }

    /// Set the criticality flag.
    pub fn critical(mut self, is_critical: bool) -> Self {
        self.is_critical = is_critical;
        self
    }

    /// Attach a context snapshot.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Attach rule-specific attributes.
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    /// Look up a rule-specific attribute.
    pub fn detail(&self, name: &str) -> Option<&Value> {
        self.details.get(name)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.key)
    }
}
