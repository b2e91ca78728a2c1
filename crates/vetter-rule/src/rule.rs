use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::trace;
use vetter_tree::{Error, ResultNode};

use crate::bridge;
use crate::config::ReportMode;
use crate::context::Context;
use crate::error::{InvalidDataError, Result, ValidationError};
use crate::messages::MessageRegistry;
use crate::options::RuleOptions;
use crate::pipeline;

/// Final outcome of [`Rule::process`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Exception mode, no error: the converted value.
    Value(Value),
    /// Result mode: the populated result node, errors or not.
    Result(ResultNode),
}

impl Outcome {
    /// The converted value, if one was produced.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Result(node) => node.value(),
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Result(node) => node.value().cloned(),
        }
    }

    pub fn result(&self) -> Option<&ResultNode> {
        match self {
            Self::Result(node) => Some(node),
            Self::Value(_) => None,
        }
    }

    pub fn into_result(self) -> Option<ResultNode> {
        match self {
            Self::Result(node) => Some(node),
            Self::Value(_) => None,
        }
    }

    pub fn contains_error(&self) -> bool {
        self.result().is_some_and(ResultNode::contains_error)
    }

    /// Deserialize the converted value into `T`.
    ///
    /// A result node without a value fails with its errors as
    /// `InvalidData`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            Self::Value(value) => value,
            Self::Result(node) => match node.value() {
                Some(value) => value.clone(),
                None => {
                    return Err(bridge::exception_from_node(&node)
                        .map(ValidationError::from)
                        .unwrap_or_else(|| {
                            ValidationError::invalid_arguments("result node holds no value")
                        }))
                }
            },
        };
        Ok(serde_json::from_value(value)?)
    }
}

/// A stateless, shareable unit of conversion and validation for one value.
///
/// Implementors provide access to their [`RuleOptions`] and override
/// [`convert`](Rule::convert) and/or [`validate`](Rule::validate). The
/// shared pipeline in [`process`](Rule::process) handles stripping,
/// emptiness, the required/default policy and both reporting modes.
///
/// Errors are reported with [`new_error`](Rule::new_error), which records
/// them on the active result node. Returning
/// `Err(ValidationError::InvalidData(..))` from `convert`/`validate` is
/// also accepted; such errors are recorded as critical.
pub trait Rule: fmt::Debug + Send + Sync {
    fn options(&self) -> &RuleOptions;

    fn options_mut(&mut self) -> &mut RuleOptions;

    /// Turn the raw input into the typed value. Shape violations here are critical.
    fn convert(&self, value: Value, _context: &mut Context) -> Result<Value> {
        Ok(value)
    }

    /// Check a successfully converted value. Not called when `convert`
    /// recorded errors.
    fn validate(&self, _value: &Value, _context: &mut Context) -> Result<()> {
        Ok(())
    }

    fn is_empty(&self, value: &Value, _context: &Context) -> bool {
        value.is_null()
    }

    /// Value returned for empty input when the rule is not required.
    fn empty_value(&self, _context: &Context) -> Value {
        self.options()
            .default_value()
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Fresh result node for one call of this rule.
    fn new_result(&self, initial_value: Value) -> ResultNode {
        ResultNode::field(initial_value)
    }

    /// Best-effort inverse of `convert`, used to redisplay a value.
    fn revert_conversion(&self, value: &Value) -> Value {
        match value {
            Value::Null => Value::Null,
            Value::String(text) => Value::String(text.clone()),
            other => Value::String(other.to_string()),
        }
    }

    fn process(&self, value: Value, context: &mut Context) -> Result<Outcome> {
        pipeline::run(self, value, context)
    }

    fn is_required(&self) -> bool {
        self.options().is_required()
    }

    fn mode(&self) -> ReportMode {
        self.options().mode()
    }

    fn messages(&self) -> &MessageRegistry {
        self.options().messages()
    }

    /// Rendered message for `key`; `values` is a JSON object (or `null`).
    fn message(&self, key: &str, context: &Context, values: &Value) -> Result<String> {
        self.messages().render(key, context, &value_map(values)?)
    }

    /// Build (but do not record) an error for `key`.
    fn error(
        &self,
        key: &str,
        value: &Value,
        context: &Context,
        values: Value,
        is_critical: bool,
    ) -> Result<Error> {
        let details = value_map(&values)?;
        let message = self.messages().render(key, context, &details)?;
        Ok(Error::new(key, message, value.clone())
            .critical(is_critical)
            .with_context(context.values().clone())
            .with_details(details))
    }

    /// Record an error for `key` on the active result node.
    fn new_error(
        &self,
        key: &str,
        value: &Value,
        context: &mut Context,
        values: Value,
        is_critical: bool,
    ) -> Result<()> {
        let error = self.error(key, value, context, values, is_critical)?;
        context.add_error(error);
        Ok(())
    }

    /// Exception-style error for `key`, for rules that prefer to fail with `Err`.
    fn exception(&self, key: &str, value: &Value, context: &Context, values: Value) -> Result<ValidationError> {
        let message = self.message(key, context, &values)?;
        Ok(InvalidDataError::new(key, message, value.clone(), context.values().clone()).into())
    }

    fn is_frozen(&self) -> bool {
        self.options().is_frozen()
    }

    fn freeze(&mut self) {
        self.options_mut().freeze();
    }

    fn unfreeze(&mut self) {
        self.options_mut().unfreeze();
    }
}

/// Run `rule` with its own fresh result node and restore the caller's node
/// afterwards, on success and failure alike.
pub fn process_scoped<R: Rule + ?Sized>(rule: &R, value: Value, context: &mut Context) -> Result<Outcome> {
    let outer = context.swap_result(Some(rule.new_result(value.clone())));
    trace!(nested = outer.is_some(), "processing scoped rule");
    let outcome = rule.process(value, context);
    context.swap_result(outer);
    outcome
}

/// Turn the outcome of a child rule into the node a parent attaches.
/// Data errors become errors on the node; programmer errors propagate.
pub fn outcome_into_node<R: Rule + ?Sized>(
    rule: &R,
    initial_value: Value,
    outcome: Result<Outcome>,
) -> Result<ResultNode> {
    match outcome {
        Ok(Outcome::Result(node)) => Ok(node),
        Ok(Outcome::Value(value)) => {
            let mut node = rule.new_result(initial_value);
            node.set_value(value);
            Ok(node)
        }
        Err(ValidationError::InvalidData(error)) => {
            let mut node = rule.new_result(initial_value);
            bridge::attach_exception(&mut node, &error);
            Ok(node)
        }
        Err(other) => Err(other),
    }
}

/// Message values as a map. `null` means "no values".
pub(crate) fn value_map(values: &Value) -> Result<Map<String, Value>> {
    match values {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        other => Err(ValidationError::invalid_arguments(format!(
            "message values must be an object, got {other}"
        ))),
    }
}
