use regex::Regex;
use serde_json::{json, Map, Value};

use crate::config::{ReportMode, RuleConfig};
use crate::context::Context;
use crate::error::{Result, ValidationError};
use crate::messages::MessageLayer;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;
use crate::rules::string::{convert_string, is_empty_string, string_layer};

/// Anchor a pattern at both ends. The group keeps alternations inside the anchors.
fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

/// Matches string input against a regular expression.
///
/// Without `use_match_for_conversion` the input string is kept and a
/// mismatch is a non-critical validation error. With it, a mismatch is a
/// critical conversion error and the converted value is the match:
///
/// ```text
/// {"match": "<whole match>", "groups": [<group 1>, ..], "named": {"<name>": <group>}}
/// ```
///
/// Groups that did not participate are `null`. Always reports in result mode.
#[derive(Debug, Clone)]
pub struct RegexRule {
    options: RuleOptions,
    regex: Regex,
    use_match_for_conversion: bool,
}

impl RegexRule {
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_config(pattern, false, RuleConfig::default())
    }

    pub fn with_config(pattern: &str, use_match_for_conversion: bool, config: RuleConfig) -> Result<Self> {
        let regex = Regex::new(&anchored(pattern))
            .map_err(|err| ValidationError::invalid_arguments(format!("invalid pattern {pattern:?}: {err}")))?;
        Self::from_regex(regex, use_match_for_conversion, config)
    }

    /// Use a precompiled expression as is (no anchoring).
    pub fn from_regex(regex: Regex, use_match_for_conversion: bool, config: RuleConfig) -> Result<Self> {
        let defaults = RuleDefaults {
            pinned_mode: Some(ReportMode::Result),
            ..RuleDefaults::default()
        };
        let layer = MessageLayer::new("regex").message(
            "bad_pattern",
            r#"Input "%(input_)s" does not match the expected pattern."#,
        );
        Ok(Self {
            options: RuleOptions::new(config, defaults, [string_layer(), layer])?,
            regex,
            use_match_for_conversion,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The match of `text` as a JSON object, `None` on mismatch.
    fn captures(&self, text: &str) -> Option<Value> {
        let captures = self.regex.captures(text)?;
        let group = |index: usize| captures.get(index).map_or(Value::Null, |m| Value::from(m.as_str()));
        let groups: Vec<Value> = (1..captures.len()).map(&group).collect();
        let named: Map<String, Value> = self
            .regex
            .capture_names()
            .enumerate()
            .filter_map(|(index, name)| Some((name?.to_string(), group(index))))
            .collect();
        Some(json!({"match": group(0), "groups": groups, "named": named}))
    }

    fn mismatch(&self, value: &Value, text: &str, context: &mut Context, is_critical: bool) -> Result<()> {
        self.new_error("bad_pattern", value, context, json!({"input_": text}), is_critical)
    }
}

impl Rule for RegexRule {
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
        let value = convert_string(self, value, context)?;
        if !self.use_match_for_conversion || !value.is_string() {
            return Ok(value);
        }
        let text = value.as_str().unwrap_or_default();
        match self.captures(text) {
            Some(matched) => Ok(matched),
            None => {
                self.mismatch(&value, text, context, true)?;
                Ok(value)
            }
        }
    }

    fn validate(&self, value: &Value, context: &mut Context) -> Result<()> {
        if self.use_match_for_conversion {
            return Ok(());
        }
        let text = value.as_str().unwrap_or_default();
        if !self.regex.is_match(text) {
            self.mismatch(value, text, context, false)?;
        }
        Ok(())
    }

    fn revert_conversion(&self, value: &Value) -> Value {
        match value.get("match") {
            Some(matched) => matched.clone(),
            None => value.clone(),
        }
    }
}
