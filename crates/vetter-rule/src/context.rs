use serde_json::{Map, Value};
use vetter_tree::{Error, ResultNode};

/// Locale used when the caller does not set one.
pub const DEFAULT_LOCALE: &str = "en";

/// Per-call state handed to every rule.
///
/// Holds caller-supplied values (such as `locale`) and the result node the
/// currently running rule writes into. A context belongs to exactly one
/// call and is never shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: Map<String, Value>,
    result: Option<ResultNode>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(locale: &str) -> Self {
        let mut context = Self::new();
        context.insert("locale", Value::String(locale.to_string()));
        context
    }

    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            values,
            result: None,
        }
    }

    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.values.insert(key.to_string(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Caller-supplied values; never contains the result node.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn locale(&self) -> &str {
        self.values
            .get("locale")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LOCALE)
    }

    pub fn result(&self) -> Option<&ResultNode> {
        self.result.as_ref()
    }

    pub fn result_mut(&mut self) -> Option<&mut ResultNode> {
        self.result.as_mut()
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    pub fn take_result(&mut self) -> Option<ResultNode> {
        self.result.take()
    }

    /// Install `node` as the active result, returning the one it replaced.
    pub fn install_result(&mut self, node: ResultNode) -> Option<ResultNode> {
        self.result.replace(node)
    }

    /// Replace the active result (or clear it) and hand back the previous one.
    pub fn swap_result(&mut self, node: Option<ResultNode>) -> Option<ResultNode> {
        std::mem::replace(&mut self.result, node)
    }

    /// Record an error on the active result node. A bare field node is
    /// created when no node is installed.
    pub fn add_error(&mut self, error: Error) {
        self.result
            .get_or_insert_with(|| ResultNode::field(error.value.clone()))
            .add_error(error);
    }

    /// Record an error on a named child of the active record node. Falls
    /// back to the node itself when it is not a record.
    pub fn add_field_error(&mut self, name: &str, error: Error) {
        let node = self
            .result
            .get_or_insert_with(|| ResultNode::record(Value::Null));
        match node.as_record_mut() {
            Some(record) => record.child_or_insert(name).add_error(error),
            None => node.add_error(error),
        }
    }

    /// Number of errors recorded on the active node so far.
    pub fn error_count(&self) -> usize {
        self.result.as_ref().map_or(0, ResultNode::error_count)
    }
}
