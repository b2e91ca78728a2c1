use serde_json::{json, Value};

use crate::config::RuleConfig;
use crate::context::Context;
use crate::error::{Result, ValidationError};
use crate::messages::MessageLayer;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;
use crate::rules::type_name;

fn integer_layer() -> MessageLayer {
    MessageLayer::new("integer")
        .message(
            "invalid_type",
            "Validator got unexpected input (expected string, got %(typename)s).",
        )
        .message("invalid_number", "Please enter a number.")
        .message("too_low", "Number must be %(min)d or greater.")
        .message("too_big", "Number must be %(max)d or smaller.")
}

/// Converts integers and decimal strings to integers, optionally bounded.
#[derive(Debug, Clone)]
pub struct IntegerRule {
    options: RuleOptions,
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerRule {
    pub fn new() -> Result<Self> {
        Self::with_config(RuleConfig::default())
    }

    pub fn with_config(config: RuleConfig) -> Result<Self> {
        Self::bounded(None, None, config)
    }

    pub fn bounded(min: Option<i64>, max: Option<i64>, config: RuleConfig) -> Result<Self> {
        check_bounds(min, max)?;
        Ok(Self {
            options: RuleOptions::new(config, RuleDefaults::default(), [integer_layer()])?,
            min,
            max,
        })
    }

    pub fn min(&self) -> Option<i64> {
        self.min
    }

    pub fn max(&self) -> Option<i64> {
        self.max
    }

    pub fn set_min(&mut self, min: Option<i64>) -> Result<()> {
        self.options.ensure_mutable()?;
        check_bounds(min, self.max)?;
        self.min = min;
        Ok(())
    }

    pub fn set_max(&mut self, max: Option<i64>) -> Result<()> {
        self.options.ensure_mutable()?;
        check_bounds(self.min, max)?;
        self.max = max;
        Ok(())
    }
}

fn check_bounds(min: Option<i64>, max: Option<i64>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::invalid_arguments(format!(
                "min must be smaller or equal to max ({min} > {max})"
            )));
        }
    }
    Ok(())
}

fn as_i128(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

impl Rule for IntegerRule {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn convert(&self, value: Value, context: &mut Context) -> Result<Value> {
        match &value {
            Value::Number(number) if !number.is_f64() => Ok(value),
            Value::String(text) => match text.trim().parse::<i64>() {
                Ok(number) => Ok(Value::from(number)),
                Err(_) => {
                    self.new_error("invalid_number", &value, context, Value::Null, true)?;
                    Ok(value)
                }
            },
            other => {
                let typename = type_name(other);
                self.new_error("invalid_type", &value, context, json!({"typename": typename}), true)?;
                Ok(value)
            }
        }
    }

    fn validate(&self, value: &Value, context: &mut Context) -> Result<()> {
        let Some(number) = as_i128(value) else {
            return Ok(());
        };
        if let Some(min) = self.min.filter(|min| number < i128::from(*min)) {
            self.new_error("too_low", value, context, json!({"min": min}), false)?;
        }
        if let Some(max) = self.max.filter(|max| number > i128::from(*max)) {
            self.new_error("too_big", value, context, json!({"max": max}), false)?;
        }
        Ok(())
    }
}
