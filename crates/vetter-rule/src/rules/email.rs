use serde_json::{json, Value};

use crate::config::RuleConfig;
use crate::context::Context;
use crate::error::Result;
use crate::messages::MessageLayer;
use crate::options::{RuleDefaults, RuleOptions};
use crate::rule::Rule;
use crate::rules::domain::{check_domain, domain_layer};
use crate::rules::string::{convert_string, is_empty_string, string_layer};

/// Simple syntax check for email addresses.
///
/// The local part may contain ASCII letters, digits and `._+-`; the domain
/// is checked like [`DomainNameRule`](crate::rules::DomainNameRule).
/// Internationalized addresses are not supported.
#[derive(Debug, Clone)]
pub struct EmailAddressRule {
    options: RuleOptions,
}

impl EmailAddressRule {
    pub fn new() -> Result<Self> {
        Self::with_config(RuleConfig::default())
    }

    pub fn with_config(config: RuleConfig) -> Result<Self> {
        let layer = MessageLayer::new("email")
            .message("single_at", "An email address must contain a single '@'.")
            .message(
                "invalid_email_character",
                r#"Invalid character "%(invalid_character)s" in email address "%(emailaddress)s"."#,
            )
            .message("missing_domain", r#"Missing domain in email address "%(emailaddress)s"."#);
        Ok(Self {
            options: RuleOptions::new(
                config,
                RuleDefaults::default(),
                [string_layer(), domain_layer(), layer],
            )?,
        })
    }
}

impl Rule for EmailAddressRule {
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
        let address = value.as_str().unwrap_or_default();
        let Some((localpart, domain)) = address.split_once('@').filter(|(_, domain)| !domain.contains('@'))
        else {
            self.new_error("single_at", value, context, Value::Null, false)?;
            return Ok(());
        };

        if !check_domain(self, value, domain, context)? {
            return Ok(());
        }
        let invalid = localpart
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+')));
        if let Some(invalid) = invalid {
            let values = json!({"invalid_character": invalid.to_string(), "emailaddress": address});
            self.new_error("invalid_email_character", value, context, values, false)?;
            return Ok(());
        }
        if domain.is_empty() {
            self.new_error("missing_domain", value, context, json!({"emailaddress": address}), false)?;
        }
        Ok(())
    }
}
