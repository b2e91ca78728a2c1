use serde_json::Value;
use tracing::debug;
use vetter_tree::ResultNode;

use crate::bridge;
use crate::config::ReportMode;
use crate::context::Context;
use crate::error::{Result, ValidationError};
use crate::rule::{Outcome, Rule};

/// Shared processing pipeline behind [`Rule::process`].
///
/// A node already installed in `context` (pre-allocated by a parent) is
/// used as this call's node; otherwise a fresh one is created. Either way
/// the node is removed from `context` before returning.
pub(crate) fn run<R: Rule + ?Sized>(rule: &R, value: Value, context: &mut Context) -> Result<Outcome> {
    if !context.has_result() {
        context.install_result(rule.new_result(value.clone()));
    }
    let converted = evaluate(rule, value, context);
    let node = context.take_result();
    let converted = converted?;
    let node = node.unwrap_or_else(|| rule.new_result(Value::Null));
    finish(rule, node, converted)
}

/// Strip, emptiness, convert and validate. Returns the converted value, or
/// `None` when no value could be produced.
fn evaluate<R: Rule + ?Sized>(rule: &R, value: Value, context: &mut Context) -> Result<Option<Value>> {
    let value = if rule.options().strip() {
        strip(value)
    } else {
        value
    };

    if rule.is_empty(&value, context) {
        if rule.is_required() {
            rule.new_error("empty", &value, context, Value::Null, true)?;
            return Ok(None);
        }
        return Ok(Some(rule.empty_value(context)));
    }

    let before = context.error_count();
    let Some(converted) = absorb(rule, rule.convert(value, context), context)? else {
        return Ok(None);
    };
    if context.error_count() == before {
        absorb(rule, rule.validate(&converted, context), context)?;
    }
    Ok(Some(converted))
}

/// Record `InvalidData` failures on the active node; programmer errors propagate.
fn absorb<R: Rule + ?Sized, T>(rule: &R, result: Result<T>, context: &mut Context) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ValidationError::InvalidData(error)) => {
            let error = error.critical(true);
            match context.result_mut() {
                Some(node) => bridge::attach_exception(node, &error),
                None => {
                    let mut node = rule.new_result(error.value().clone());
                    bridge::attach_exception(&mut node, &error);
                    context.install_result(node);
                }
            }
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

fn finish<R: Rule + ?Sized>(rule: &R, mut node: ResultNode, converted: Option<Value>) -> Result<Outcome> {
    let mode = rule.mode();
    debug!(
        ?mode,
        errors = node.error_count(),
        critical = node.contains_critical_error(),
        "rule finished"
    );
    match mode {
        ReportMode::Exception => match bridge::exception_from_node(&node) {
            Some(error) => Err(error.into()),
            None => Ok(Outcome::Value(converted.unwrap_or(Value::Null))),
        },
        ReportMode::Result => {
            if !node.contains_critical_error() {
                if let Some(value) = converted {
                    node.set_value(value);
                }
            }
            Ok(Outcome::Result(node))
        }
    }
}

fn strip(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(text.trim().to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::config::RuleConfig;
    use crate::options::{RuleDefaults, RuleOptions};

    #[derive(Debug)]
    struct Counting {
        options: RuleOptions,
        validated: AtomicUsize,
    }

    impl Counting {
        fn new(config: RuleConfig) -> Self {
            Self {
                options: RuleOptions::new(config, RuleDefaults::default(), []).unwrap(),
                validated: AtomicUsize::new(0),
            }
        }
    }

    impl Rule for Counting {
        fn options(&self) -> &RuleOptions {
            &self.options
        }

        fn options_mut(&mut self) -> &mut RuleOptions {
            &mut self.options
        }

        fn convert(&self, value: Value, context: &mut Context) -> Result<Value> {
            if value == json!("bad") {
                self.new_error("empty", &value, context, Value::Null, true)?;
            }
            Ok(value)
        }

        fn validate(&self, _value: &Value, _context: &mut Context) -> Result<()> {
            self.validated.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn validate_is_skipped_after_convert_errors() {
        let rule = Counting::new(RuleConfig::new().result_mode());

        rule.process(json!("good"), &mut Context::new()).unwrap();
        assert_eq!(rule.validated.load(Ordering::SeqCst), 1);

        let outcome = rule.process(json!("bad"), &mut Context::new()).unwrap();
        assert!(outcome.contains_error());
        assert_eq!(rule.validated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_input_skips_convert_and_validate() {
        let rule = Counting::new(RuleConfig::new().required(false));
        let outcome = rule.process(Value::Null, &mut Context::new()).unwrap();

        assert_eq!(outcome, Outcome::Value(Value::Null));
        assert_eq!(rule.validated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn preinstalled_node_is_used_and_removed() {
        let rule = Counting::new(RuleConfig::new().result_mode());
        let mut context = Context::new();
        let mut node = ResultNode::field(json!("good"));
        node.meta_mut().insert("label".to_string(), json!("Name"));
        context.install_result(node);

        let node = rule.process(json!("good"), &mut context).unwrap().into_result().unwrap();
        assert_eq!(node.meta().get("label"), Some(&json!("Name")));
        assert!(!context.has_result());
    }

    #[test]
    fn strip_only_touches_strings() {
        assert_eq!(strip(json!("  a b ")), json!("a b"));
        assert_eq!(strip(json!(1)), json!(1));
    }
}
