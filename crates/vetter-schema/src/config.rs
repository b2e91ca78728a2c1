use serde::Deserialize;
use vetter_rule::RuleConfig;

/// Controls how a [`Schema`](crate::Schema) treats input keys it does not declare.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// When false, every undeclared key gets a non-critical `additional_item` error.
    pub allow_additional_parameters: bool,
    /// When true, undeclared keys are dropped from the output instead of
    /// passed through unchanged.
    pub filter_unvalidated_parameters: bool,
    /// Options of the schema rule itself.
    pub rule: RuleConfig,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            allow_additional_parameters: true,
            filter_unvalidated_parameters: true,
            rule: RuleConfig::default(),
        }
    }
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_additional_parameters(mut self, allow: bool) -> Self {
        self.allow_additional_parameters = allow;
        self
    }

    pub fn filter_unvalidated_parameters(mut self, filter: bool) -> Self {
        self.filter_unvalidated_parameters = filter;
        self
    }

    pub fn rule(mut self, rule: RuleConfig) -> Self {
        self.rule = rule;
        self
    }
}

/// Length bounds of a [`ForEach`](crate::ForEach).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForEachConfig {
    pub min_length: Option<usize>,
    /// Longer input gets a `too_long` error and is truncated to this length.
    pub max_length: Option<usize>,
    pub rule: RuleConfig,
}

impl ForEachConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn rule(mut self, rule: RuleConfig) -> Self {
        self.rule = rule;
        self
    }
}

/// Controls JSON Schema compilation and reporting.
#[cfg(feature = "json-schema")]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonSchemaConfig {
    /// When true, object schemas reject properties they do not declare.
    pub strict_mode: bool,
    /// Maximum number of violations recorded per value.
    pub max_errors: usize,
    pub rule: RuleConfig,
}

#[cfg(feature = "json-schema")]
impl Default for JsonSchemaConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_errors: 4,
            rule: RuleConfig::default(),
        }
    }
}
