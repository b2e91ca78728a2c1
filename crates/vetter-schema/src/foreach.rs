use std::sync::Arc;

use serde_json::{json, Value};
use tracing::trace;
use vetter_rule::rules::type_name;
use vetter_rule::{
    outcome_into_node, process_scoped, Context, MessageLayer, Result, Rule, RuleDefaults, RuleOptions,
    ValidationError,
};
use vetter_tree::ResultNode;

use crate::config::ForEachConfig;
use crate::scope::active_repeating;

fn foreach_layer() -> MessageLayer {
    MessageLayer::new("foreach")
        .message(
            "invalid_type",
            r#"Validator got unexpected input (expected "list", got "%(classname)s")."#,
        )
        .message("too_short", "More than %(min)d items required.")
        .message("too_long", "Less than %(max)d items required.")
}

/// Applies one rule to every element of a list.
///
/// Each element gets its own result node; the nodes are collected in a
/// sequence node, so errors can be traced back to input positions. Length
/// violations are non-critical global errors, and input longer than
/// `max_length` is truncated before the elements are processed.
///
/// Not required by default: empty input becomes the configured default or `[]`.
#[derive(Debug, Clone)]
pub struct ForEach {
    options: RuleOptions,
    rule: Arc<dyn Rule>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl ForEach {
    pub fn new<R: Rule + 'static>(rule: R) -> Result<Self> {
        Self::with_config(Arc::new(rule), ForEachConfig::default())
    }

    pub fn with_config(rule: Arc<dyn Rule>, config: ForEachConfig) -> Result<Self> {
        let ForEachConfig {
            min_length,
            max_length,
            rule: rule_config,
        } = config;
        check_bounds(min_length, max_length)?;
        let defaults = RuleDefaults {
            required: false,
            ..RuleDefaults::default()
        };
        Ok(Self {
            options: RuleOptions::new(rule_config, defaults, [foreach_layer()])?,
            rule,
            min_length,
            max_length,
        })
    }

    /// The rule applied to every element.
    pub fn rule(&self) -> &Arc<dyn Rule> {
        &self.rule
    }

    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn set_min_length(&mut self, min_length: Option<usize>) -> Result<()> {
        self.options.ensure_mutable()?;
        check_bounds(min_length, self.max_length)?;
        self.min_length = min_length;
        Ok(())
    }

    pub fn set_max_length(&mut self, max_length: Option<usize>) -> Result<()> {
        self.options.ensure_mutable()?;
        check_bounds(self.min_length, max_length)?;
        self.max_length = max_length;
        Ok(())
    }
}

fn check_bounds(min_length: Option<usize>, max_length: Option<usize>) -> Result<()> {
    if let (Some(min), Some(max)) = (min_length, max_length) {
        if min > max {
            return Err(ValidationError::invalid_arguments(format!(
                "min_length must be smaller or equal to max_length ({min} > {max})"
            )));
        }
    }
    Ok(())
}

impl Rule for ForEach {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn empty_value(&self, _context: &Context) -> Value {
        self.options
            .default_value()
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()))
    }

    fn new_result(&self, initial_value: Value) -> ResultNode {
        ResultNode::repeating(initial_value)
    }

    fn convert(&self, value: Value, context: &mut Context) -> Result<Value> {
        let mut items = match value {
            Value::Array(items) => items,
            other => {
                let params = json!({"classname": type_name(&other)});
                self.new_error("invalid_type", &other, context, params, true)?;
                return Ok(other);
            }
        };

        if let Some(min) = self.min_length.filter(|min| items.len() < *min) {
            let value = Value::Array(items.clone());
            self.new_error("too_short", &value, context, json!({"min": min}), false)?;
        }
        if let Some(max) = self.max_length.filter(|max| items.len() > *max) {
            let value = Value::Array(items.clone());
            self.new_error("too_long", &value, context, json!({"max": max}), false)?;
            items.truncate(max);
        }

        let mut converted = Vec::with_capacity(items.len());
        let mut nodes = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            trace!(index, "processing item");
            let outcome = process_scoped(self.rule.as_ref(), item.clone(), context);
            let node = outcome_into_node(self.rule.as_ref(), item, outcome)?;
            converted.push(node.value().cloned().unwrap_or(Value::Null));
            nodes.push(node);
        }

        if let Some(repeating) = active_repeating(context, &Value::Null) {
            repeating.set_items(nodes);
        }
        Ok(Value::Array(converted))
    }
}
