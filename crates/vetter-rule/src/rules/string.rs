use serde_json::{json, Value};

use crate::config::RuleConfig;
use crate::context::Context;
use crate::error::{Result, ValidationError};
use crate::messages::MessageLayer;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;
use crate::rules::type_name;

pub(crate) fn string_layer() -> MessageLayer {
    MessageLayer::new("string")
        .message(
            "invalid_type",
            "Validator got unexpected input (expected string, got %(typename)s).",
        )
        .message("too_short", "Please enter at least %(min)d characters.")
        .message("too_long", "Please enter no more than %(max)d characters.")
}

/// `null` and `""` are both empty for string rules.
pub(crate) fn is_empty_string(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Records a critical `invalid_type` error for non-string input.
pub(crate) fn convert_string<R: Rule + ?Sized>(rule: &R, value: Value, context: &mut Context) -> Result<Value> {
    if !value.is_string() {
        let typename = type_name(&value);
        rule.new_error("invalid_type", &value, context, json!({"typename": typename}), true)?;
    }
    Ok(value)
}

/// Accepts strings, optionally bounded in length (counted in characters).
#[derive(Debug, Clone)]
pub struct StringRule {
    options: RuleOptions,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl StringRule {
    pub fn new() -> Result<Self> {
        Self::with_config(RuleConfig::default())
    }

    pub fn with_config(config: RuleConfig) -> Result<Self> {
        Self::with_length(None, None, config)
    }

    pub fn with_length(min_length: Option<usize>, max_length: Option<usize>, config: RuleConfig) -> Result<Self> {
        check_lengths(min_length, max_length)?;
        Ok(Self {
            options: RuleOptions::new(config, RuleDefaults::default(), [string_layer()])?,
            min_length,
            max_length,
        })
    }

    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn set_min_length(&mut self, min_length: Option<usize>) -> Result<()> {
        self.options.ensure_mutable()?;
        check_lengths(min_length, self.max_length)?;
        self.min_length = min_length;
        Ok(())
    }

    pub fn set_max_length(&mut self, max_length: Option<usize>) -> Result<()> {
        self.options.ensure_mutable()?;
        check_lengths(self.min_length, max_length)?;
        self.max_length = max_length;
        Ok(())
    }
}

fn check_lengths(min_length: Option<usize>, max_length: Option<usize>) -> Result<()> {
    if let (Some(min), Some(max)) = (min_length, max_length) {
        if min > max {
            return Err(ValidationError::invalid_arguments(format!(
                "min_length must be smaller or equal to max_length ({min} > {max})"
            )));
        }
    }
    Ok(())
}

impl Rule for StringRule {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn is_empty(&self, value: &Value, _context: &Context) -> bool {
        is_empty_string(value)
    }

    fn convert(&self, value: Value, context: &mut Context) -> Result<Value> {
        convert_string(self, value, context)
    }

    fn validate(&self, value: &Value, context: &mut Context) -> Result<()> {
        let length = value.as_str().map_or(0, |text| text.chars().count());
        if let Some(min) = self.min_length.filter(|min| length < *min) {
            self.new_error("too_short", value, context, json!({"min": min}), false)?;
        }
        if let Some(max) = self.max_length.filter(|max| length > *max) {
            self.new_error("too_long", value, context, json!({"max": max}), false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Outcome;

    fn result_mode() -> RuleConfig {
        RuleConfig::new().result_mode()
    }

    #[test]
    fn accepts_strings() {
        let rule = StringRule::new().unwrap();
        let outcome = rule.process(json!("foo"), &mut Context::new()).unwrap();
        assert_eq!(outcome, Outcome::Value(json!("foo")));
    }

    #[test]
    fn length_setters_keep_bounds_consistent() {
        let mut rule = StringRule::with_length(Some(2), Some(4), RuleConfig::default()).unwrap();
        rule.unfreeze();

        assert!(matches!(rule.set_min_length(Some(5)), Err(ValidationError::InvalidArguments(_))));
        assert!(matches!(rule.set_max_length(Some(1)), Err(ValidationError::InvalidArguments(_))));
        assert_eq!((rule.min_length(), rule.max_length()), (Some(2), Some(4)));

        rule.set_max_length(Some(8)).unwrap();
        rule.set_min_length(Some(5)).unwrap();
        rule.freeze();
        assert!(rule.process(json!("abcd"), &mut Context::new()).is_err());
    }

    #[test]
    fn empty_string_is_empty() {
        let rule = StringRule::new().unwrap();
        let err = rule.process(json!(""), &mut Context::new()).unwrap_err();
        assert_eq!(err.as_invalid_data().map(|e| e.key().to_string()), Some("empty".to_string()));

        let rule = StringRule::with_config(RuleConfig::new().required(false)).unwrap();
        assert_eq!(rule.process(json!(""), &mut Context::new()).unwrap(), Outcome::Value(Value::Null));
    }

    #[test]
    fn rejects_non_strings_critically() {
        let rule = StringRule::with_config(result_mode()).unwrap();
        let node = rule.process(json!(42), &mut Context::new()).unwrap().into_result().unwrap();

        let error = node.first_error().unwrap();
        assert_eq!(error.key, "invalid_type");
        assert!(error.is_critical);
        assert_eq!(
            error.message,
            "Validator got unexpected input (expected string, got int)."
        );
        assert!(node.value().is_none());
    }

    #[test]
    fn length_bounds_are_not_critical() {
        let rule = StringRule::with_length(Some(3), Some(5), result_mode()).unwrap();

        let node = rule.process(json!("ab"), &mut Context::new()).unwrap().into_result().unwrap();
        let error = node.first_error().unwrap();
        assert_eq!(error.key, "too_short");
        assert_eq!(error.message, "Please enter at least 3 characters.");
        assert!(!error.is_critical);
        assert_eq!(node.value(), Some(&json!("ab")));

        let node = rule.process(json!("abcdef"), &mut Context::new()).unwrap().into_result().unwrap();
        assert_eq!(node.first_error().map(|e| e.key.as_str()), Some("too_long"));

        let node = rule.process(json!("äöü"), &mut Context::new()).unwrap().into_result().unwrap();
        assert!(!node.contains_error());
    }

    #[test]
    fn inconsistent_bounds_are_rejected() {
        let err = StringRule::with_length(Some(5), Some(3), RuleConfig::default()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidArguments(_)));
    }

    #[test]
    fn bounds_are_frozen() {
        let mut rule = StringRule::new().unwrap();
        assert!(matches!(rule.set_min_length(Some(1)), Err(ValidationError::ThreadSafety(_))));

        rule.unfreeze();
        rule.set_min_length(Some(1)).unwrap();
        rule.freeze();
        assert_eq!(rule.min_length(), Some(1));
    }
}
