use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a rule reports invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Return the converted value or fail with `ValidationError::InvalidData`.
    #[default]
    Exception,
    /// Always return the result node with all errors recorded on it.
    Result,
}

/// Construction options shared by all rules.
///
/// Unset options fall back to the defaults of the concrete rule type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    /// Whether an empty input is an error. Defaults to `true` for most rules.
    pub required: Option<bool>,
    /// Value used for empty input when the rule is not required.
    pub default: Option<Value>,
    /// Reporting mode. Some rule types pin this.
    pub mode: Option<ReportMode>,
    /// Trim surrounding whitespace from string input before anything else.
    pub strip: Option<bool>,
    /// Per-instance message template overrides, keyed by message key.
    pub messages: IndexMap<String, String>,
}

impl RuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default_value(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn mode(mut self, mode: ReportMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Shorthand for `mode(ReportMode::Result)`.
    pub fn result_mode(self) -> Self {
        self.mode(ReportMode::Result)
    }

    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = Some(strip);
        self
    }

    pub fn message(mut self, key: &str, template: &str) -> Self {
        self.messages.insert(key.to_string(), template.to_string());
        self
    }
}
