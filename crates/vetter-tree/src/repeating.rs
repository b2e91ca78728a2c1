use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::node::{ErrorShape, ResultNode};

/// Result node for a sequence: one child per processed element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepeatingValue {
    initial_value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    items: Vec<ResultNode>,
    global_errors: Vec<Error>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl RepeatingValue {
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

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Store the converted sequence; element values are pushed into the
    /// items at the same position.
    pub fn set_value(&mut self, value: Value) {
        if let Value::Array(values) = &value {
            for (item, item_value) in self.items.iter_mut().zip(values) {
                if !item.contains_critical_error() {
                    item.set_value(item_value.clone());
                }
            }
        }
        self.value = Some(value);
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    pub fn push(&mut self, item: ResultNode) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[ResultNode] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&ResultNode> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut ResultNode> {
        self.items.get_mut(index)
    }

    pub fn set_items(&mut self, items: Vec<ResultNode>) {
        self.items = items;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Initial values of all items, in input order.
    pub fn item_initial_values(&self) -> Vec<Value> {
        self.items
            .iter()
            .map(|item| item.initial_value().clone())
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

    /// One slot per item, `None` where the item is clean.
    pub fn item_errors(&self) -> Vec<Option<ErrorShape>> {
        self.items
            .iter()
            .map(|item| item.contains_error().then(|| item.errors()))
            .collect()
    }

    pub fn contains_error(&self) -> bool {
        !self.global_errors.is_empty() || self.items.iter().any(ResultNode::contains_error)
    }

    pub fn contains_critical_error(&self) -> bool {
        self.global_errors.iter().any(|error| error.is_critical)
            || self.items.iter().any(ResultNode::contains_critical_error)
    }

    pub fn error_count(&self) -> usize {
        self.global_errors.len()
            + self
                .items
                .iter()
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
