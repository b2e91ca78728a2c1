use serde_json::{json, Value};

use crate::config::RuleConfig;
use crate::context::Context;
use crate::error::Result;
use crate::messages::MessageLayer;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;
use crate::rules::string::{convert_string, is_empty_string, string_layer};

pub(crate) fn domain_layer() -> MessageLayer {
    MessageLayer::new("domain")
        .message(
            "invalid_domain_character",
            r#"Invalid character "%(invalid_character)s" in domain "%(domain)s"."#,
        )
        .message("leading_dot", r#"Invalid domain: "%(domain)s" must not start with a dot."#)
        .message("trailing_dot", r#"Invalid domain: "%(domain)s" must not end with a dot."#)
        .message(
            "double_dot",
            r#"Invalid domain: "%(domain)s" must not contain consecutive dots."#,
        )
}

/// Checks the syntax of `domain`, recording at most one error against
/// `value`. Returns `false` when an error was recorded.
pub(crate) fn check_domain<R: Rule + ?Sized>(
    rule: &R,
    value: &Value,
    domain: &str,
    context: &mut Context,
) -> Result<bool> {
    let key = if domain.starts_with('.') {
        Some("leading_dot")
    } else if domain.ends_with('.') {
        Some("trailing_dot")
    } else if domain.contains("..") {
        Some("double_dot")
    } else {
        None
    };
    if let Some(key) = key {
        rule.new_error(key, value, context, json!({"domain": domain}), false)?;
        return Ok(false);
    }

    let invalid = domain
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'));
    if let Some(invalid) = invalid {
        rule.new_error(
            "invalid_domain_character",
            value,
            context,
            json!({"invalid_character": invalid.to_string(), "domain": domain}),
            false,
        )?;
        return Ok(false);
    }
    Ok(true)
}

/// Syntax check for domain names (no DNS lookups).
#[derive(Debug, Clone)]
pub struct DomainNameRule {
    options: RuleOptions,
}

impl DomainNameRule {
    pub fn new() -> Result<Self> {
        Self::with_config(RuleConfig::default())
    }

    pub fn with_config(config: RuleConfig) -> Result<Self> {
        Ok(Self {
            options: RuleOptions::new(config, RuleDefaults::default(), [string_layer(), domain_layer()])?,
        })
    }
}

impl Rule for DomainNameRule {
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
        let domain = value.as_str().unwrap_or_default();
        check_domain(self, value, domain, context)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Outcome;

    fn first_key(value: &str) -> Option<String> {
        let rule = DomainNameRule::new().unwrap();
        rule.process(json!(value), &mut Context::new())
            .err()
            .and_then(|err| err.as_invalid_data().map(|e| e.key().to_string()))
    }

    #[test]
    fn accepts_valid_domains() {
        let rule = DomainNameRule::new().unwrap();
        for domain in ["example.com", "sub.example-site.org", "localhost"] {
            assert_eq!(
                rule.process(json!(domain), &mut Context::new()).unwrap(),
                Outcome::Value(json!(domain))
            );
        }
    }

    #[test]
    fn rejects_dots_in_wrong_places() {
        assert_eq!(first_key(".example.com").as_deref(), Some("leading_dot"));
        assert_eq!(first_key("example.com.").as_deref(), Some("trailing_dot"));
        assert_eq!(first_key("example..com").as_deref(), Some("double_dot"));
    }

    #[test]
    fn rejects_invalid_characters() {
        let rule = DomainNameRule::new().unwrap();
        let err = rule.process(json!("exa_mple.com"), &mut Context::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Invalid character "_" in domain "exa_mple.com"."#
        );
    }
}
