use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::node::{ErrorShape, ResultNode};

/// Result node for a mapping: one child per field plus record-level errors.
///
/// `global_errors` hold violations not attributable to a single field
/// (wrong input type, cross-field checks). They are stored only here and
/// counted exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordValue {
    initial_value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    children: IndexMap<String, ResultNode>,
    global_errors: Vec<Error>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl RecordValue {
    pub fn new(initial_value: Value) -> Self {
        Self {
            initial_value,
            ..Self::default()
        }
    }

    pub fn initial_value(&self) -> &Value {
        &self.initial_value
    }

    pub fn set_initial_value(&mut self, initial_value: Value) {
        self.initial_value = initial_value;
    }

    /// The converted mapping, stored by the owning rule once processing
    /// finished without critical errors.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Store the converted mapping and push matching entries down into
    /// existing children.
    pub fn set_value(&mut self, value: Value) {
        if let Value::Object(fields) = &value {
            for (name, child) in self.children.iter_mut() {
                if let Some(field_value) = fields.get(name) {
                    if !child.contains_critical_error() {
                        child.set_value(field_value.clone());
                    }
                }
            }
        }
        self.value = Some(value);
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// Insert or replace a child, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, child: ResultNode) -> Option<ResultNode> {
        self.children.insert(name.into(), child)
    }

    pub fn child(&self, name: &str) -> Option<&ResultNode> {
        self.children.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut ResultNode> {
        self.children.get_mut(name)
    }

    /// Child for `name`, creating an empty field node when missing.
    pub fn child_or_insert(&mut self, name: &str) -> &mut ResultNode {
        self.children
            .entry(name.to_string())
            .or_insert_with(|| ResultNode::field(Value::Null))
    }

    pub fn remove(&mut self, name: &str) -> Option<ResultNode> {
        self.children.shift_remove(name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &ResultNode)> {
        self.children.iter().map(|(name, child)| (name.as_str(), child))
    }

    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Converted values of all children; children without a value map to `null`.
    pub fn child_values(&self) -> Map<String, Value> {
        self.children
            .iter()
            .map(|(name, child)| (name.clone(), child.value().cloned().unwrap_or(Value::Null)))
            .collect()
    }

    pub fn global_errors(&self) -> &[Error] {
        &self.global_errors
    }

    pub fn add_global_error(&mut self, error: Error) {
        self.global_errors.push(error);
    }

    pub fn set_global_errors(&mut self, errors: Vec<Error>) {
        self.global_errors = errors;
    }

    /// Per-field error shapes for children that carry errors.
    pub fn field_errors(&self) -> IndexMap<String, ErrorShape> {
        self.children
            .iter()
            .filter(|(_, child)| child.contains_error())
            .map(|(name, child)| (name.clone(), child.errors()))
            .collect()
    }

    pub fn contains_error(&self) -> bool {
        !self.global_errors.is_empty() || self.children.values().any(ResultNode::contains_error)
    }

    pub fn contains_critical_error(&self) -> bool {
        self.global_errors.iter().any(|error| error.is_critical)
            || self
                .children
                .values()
                .any(ResultNode::contains_critical_error)
    }

    pub fn error_count(&self) -> usize {
        self.global_errors.len()
            + self
                .children
                .values()
                .map(ResultNode::error_count)
                .sum::<usize>()
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.meta
    }
}
