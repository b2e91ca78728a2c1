use crate::config::RuleConfig;
use crate::error::Result;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;

/// Accepts any non-empty value unchanged.
#[derive(Debug, Clone)]
pub struct AnyRule {
    options: RuleOptions,
}

impl AnyRule {
    pub fn new() -> Result<Self> {
        Self::with_config(RuleConfig::default())
    }

    pub fn with_config(config: RuleConfig) -> Result<Self> {
        Ok(Self {
            options: RuleOptions::new(config, RuleDefaults::default(), [])?,
        })
    }
}

impl Rule for AnyRule {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }
}
