use serde_json::Value;
use vetter_rule::{Context, MessageLayer, Result, Rule, RuleConfig, RuleDefaults, RuleOptions};
use vetter_tree::ResultNode;

/// Whole-record rule requiring two fields to hold the same value, such as
/// a password and its confirmation.
///
/// A mismatch is reported on the second field.
#[derive(Debug, Clone)]
pub struct MatchingFields {
    options: RuleOptions,
    first: String,
    second: String,
}

impl MatchingFields {
    pub fn new(first: &str, second: &str) -> Result<Self> {
        Self::with_config(first, second, RuleConfig::default())
    }

    pub fn with_config(first: &str, second: &str, config: RuleConfig) -> Result<Self> {
        let layer = MessageLayer::new("matching").message("mismatch", "Fields do not match");
        Ok(Self {
            options: RuleOptions::new(config, RuleDefaults::default(), [layer])?,
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    pub fn fields(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

impl Rule for MatchingFields {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn new_result(&self, initial_value: Value) -> ResultNode {
        ResultNode::record(initial_value)
    }

    fn validate(&self, values: &Value, context: &mut Context) -> Result<()> {
        let second = values.get(&self.second).cloned().unwrap_or(Value::Null);
        if values.get(&self.first) != values.get(&self.second) {
            let error = self.error("mismatch", &second, context, Value::Null, false)?;
            context.add_field_error(&self.second, error);
        }
        Ok(())
    }
}
