use serde_json::Value;

use crate::config::RuleConfig;
use crate::context::Context;
use crate::error::Result;
use crate::messages::MessageLayer;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;

/// Accepts only values from a fixed list.
#[derive(Debug, Clone)]
pub struct OneOf {
    options: RuleOptions,
    allowed: Vec<Value>,
}

impl OneOf {
    pub fn new(allowed: impl IntoIterator<Item = Value>) -> Result<Self> {
        Self::with_config(allowed, RuleConfig::default())
    }

    pub fn with_config(allowed: impl IntoIterator<Item = Value>, config: RuleConfig) -> Result<Self> {
        let layer = MessageLayer::new("oneof").message("value_not_allowed", "This value is not allowed.");
        Ok(Self {
            options: RuleOptions::new(config, RuleDefaults::default(), [layer])?,
            allowed: allowed.into_iter().collect(),
        })
    }

    pub fn allowed(&self) -> &[Value] {
        &self.allowed
    }
}

impl Rule for OneOf {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn validate(&self, value: &Value, context: &mut Context) -> Result<()> {
        if !self.allowed.contains(value) {
            self.new_error("value_not_allowed", value, context, Value::Null, false)?;
        }
        Ok(())
    }
}
