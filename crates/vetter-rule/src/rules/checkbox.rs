use serde_json::Value;

use crate::config::RuleConfig;
use crate::context::Context;
use crate::error::Result;
use crate::messages::MessageLayer;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;
use crate::rules::string::string_layer;

const TRUEISH: [&str; 4] = ["true", "t", "on", "1"];
const FALSISH: [&str; 5] = ["false", "f", "off", "0", ""];

fn checkbox_layer() -> MessageLayer {
    MessageLayer::new("checkbox").message("unknown_bool", r#"Value should be "true" or "false"."#)
}

fn checkbox_defaults() -> RuleDefaults {
    RuleDefaults {
        required: false,
        strip: true,
        pinned_mode: None,
    }
}

/// Parses checkbox-style booleans; returns `None` for unknown input.
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => {
            let text = text.trim().to_lowercase();
            if TRUEISH.contains(&text.as_str()) {
                Some(true)
            } else if FALSISH.contains(&text.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn convert_checkbox<R: Rule + ?Sized>(rule: &R, value: Value, context: &mut Context) -> Result<Value> {
    match parse_bool(&value) {
        Some(flag) => Ok(Value::Bool(flag)),
        None => {
            rule.new_error("unknown_bool", &value, context, Value::Null, true)?;
            Ok(value)
        }
    }
}

/// HTML-checkbox boolean: optional, stripped, empty means `false`.
#[derive(Debug, Clone)]
pub struct BooleanCheckbox {
    options: RuleOptions,
}

impl BooleanCheckbox {
    pub fn new() -> Result<Self> {
        Self::with_config(RuleConfig::default())
    }

    pub fn with_config(config: RuleConfig) -> Result<Self> {
        Ok(Self {
            options: RuleOptions::new(config, checkbox_defaults(), [string_layer(), checkbox_layer()])?,
        })
    }
}

impl Rule for BooleanCheckbox {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn convert(&self, value: Value, context: &mut Context) -> Result<Value> {
        convert_checkbox(self, value, context)
    }

    fn empty_value(&self, _context: &Context) -> Value {
        Value::Bool(false)
    }

    /// `true` for trueish values, `false` for everything else.
    fn revert_conversion(&self, value: &Value) -> Value {
        Value::Bool(parse_bool(value).unwrap_or(false))
    }
}

/// Checkbox that must be ticked. Missing input counts as `false`.
#[derive(Debug, Clone)]
pub struct AgreeToConditionsCheckbox {
    options: RuleOptions,
}

impl AgreeToConditionsCheckbox {
    pub fn new() -> Result<Self> {
        Self::with_config(RuleConfig::default())
    }

    /// `required` is always forced to `true`.
    pub fn with_config(config: RuleConfig) -> Result<Self> {
        let config = config.required(true);
        let layer = MessageLayer::new("agree").message("must_agree", "Please accept our Terms and Conditions.");
        Ok(Self {
            options: RuleOptions::new(
                config,
                checkbox_defaults(),
                [string_layer(), checkbox_layer(), layer],
            )?,
        })
    }
}

impl Rule for AgreeToConditionsCheckbox {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn is_empty(&self, _value: &Value, _context: &Context) -> bool {
        false
    }

    fn convert(&self, value: Value, context: &mut Context) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Bool(false));
        }
        convert_checkbox(self, value, context)
    }

    fn validate(&self, value: &Value, context: &mut Context) -> Result<()> {
        if value != &Value::Bool(true) {
            self.new_error("must_agree", value, context, Value::Null, true)?;
        }
        Ok(())
    }

    fn empty_value(&self, _context: &Context) -> Value {
        Value::Bool(false)
    }

    fn revert_conversion(&self, value: &Value) -> Value {
        Value::Bool(parse_bool(value).unwrap_or(false))
    }
}
