use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// Result node for a single (leaf) value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldValue {
    initial_value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    errors: Vec<Error>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl FieldValue {
    /// Create a node for `initial_value` with no converted value yet.
    pub fn new(initial_value: Value) -> Self {
        Self {
            initial_value,
            ..Self::default()
        }
    }

    /// The raw input this node was created for.
    pub fn initial_value(&self) -> &Value {
        &self.initial_value
    }

    pub fn set_initial_value(&mut self, initial_value: Value) {
        self.initial_value = initial_value;
    }

    /// The converted value. `None` until a rule stores one.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// Errors in the order they were recorded.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn add_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Replace all errors. An empty vector means "no errors".
    pub fn set_errors(&mut self, errors: Vec<Error>) {
        self.errors = errors;
    }

    pub fn contains_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn contains_critical_error(&self) -> bool {
        self.errors.iter().any(|error| error.is_critical)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn error(critical: bool) -> Error {
        Error::new("bad", "bad input", Value::Null).critical(critical)
    }

    #[test]
    fn new_node_has_no_value_and_no_errors() {
        let field = FieldValue::new(json!("42"));

        assert_eq!(field.initial_value(), &json!("42"));
        assert!(field.value().is_none());
        assert!(!field.contains_error());
        assert_eq!(field.error_count(), 0);
    }

    #[test]
    fn tracks_critical_and_non_critical_errors() {
        let mut field = FieldValue::new(json!(1));
        field.add_error(error(false));
        assert!(field.contains_error());
        assert!(!field.contains_critical_error());

        field.add_error(error(true));
        assert!(field.contains_critical_error());
        assert_eq!(field.error_count(), 2);
    }

    #[test]
    fn set_errors_with_empty_vec_clears() {
        let mut field = FieldValue::new(Value::Null);
        field.add_error(error(true));
        field.set_errors(Vec::new());

        assert!(!field.contains_error());
    }

    #[test]
    fn clone_is_independent() {
        let mut field = FieldValue::new(Value::Null);
        field.set_value(json!({}));

        let mut clone = field.clone();
        clone.add_error(error(true));
        clone.set_value(json!({"new": 21}));
        clone.meta_mut().insert("css".to_string(), json!("wide"));

        assert_eq!(field.value(), Some(&json!({})));
        assert!(!field.contains_error());
        assert!(field.meta().is_empty());
    }
}
