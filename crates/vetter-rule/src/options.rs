use std::sync::Arc;

use serde_json::Value;

use crate::config::{ReportMode, RuleConfig};
use crate::error::{Result, ValidationError};
use crate::messages::{MessageLayer, MessageRegistry};

/// Message layer every rule starts from.
pub fn base_layer() -> MessageLayer {
    MessageLayer::new("base").message("empty", "Value must not be empty.")
}

/// Type-level defaults a rule applies to unset [`RuleConfig`] options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDefaults {
    pub required: bool,
    pub strip: bool,
    /// Reporting mode fixed by the rule type; an explicit different mode is rejected.
    pub pinned_mode: Option<ReportMode>,
}

impl Default for RuleDefaults {
    fn default() -> Self {
        Self {
            required: true,
            strip: false,
            pinned_mode: None,
        }
    }
}

/// Resolved, immutable-by-default options of a rule instance.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOptions {
    required: bool,
    default: Option<Value>,
    mode: ReportMode,
    strip: bool,
    messages: Arc<MessageRegistry>,
    frozen: bool,
}

impl RuleOptions {
    /// Resolve `config` against the type `defaults`. `layers` are the rule
    /// type's message layers below the base layer, generic first.
    ///
    /// The returned options are frozen.
    pub fn new(
        config: RuleConfig,
        defaults: RuleDefaults,
        layers: impl IntoIterator<Item = MessageLayer>,
    ) -> Result<Self> {
        if config.required == Some(true) && config.default.is_some() {
            return Err(ValidationError::invalid_arguments(format!(
                "default value {} has no effect because a value is required",
                config.default.as_ref().map(Value::to_string).unwrap_or_default()
            )));
        }
        let mode = match (defaults.pinned_mode, config.mode) {
            (Some(pinned), Some(requested)) if pinned != requested => {
                return Err(ValidationError::invalid_arguments(format!(
                    "this rule always uses {pinned:?} mode, {requested:?} was requested"
                )));
            }
            (Some(pinned), _) => pinned,
            (None, requested) => requested.unwrap_or_default(),
        };
        let registry = MessageRegistry::new(std::iter::once(base_layer()).chain(layers))
            .with_overrides(&config.messages);

        Ok(Self {
            required: config.required.unwrap_or(defaults.required),
            default: config.default,
            mode,
            strip: config.strip.unwrap_or(defaults.strip),
            messages: Arc::new(registry),
            frozen: true,
        })
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    pub fn strip(&self) -> bool {
        self.strip
    }

    pub fn messages(&self) -> &MessageRegistry {
        &self.messages
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Fails with `ThreadSafety` while frozen. Every mutator calls this first.
    pub fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(ValidationError::ThreadSafety(
                "do not store state in a rule instance, it is shared between threads".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_required(&mut self, required: bool) -> Result<()> {
        self.ensure_mutable()?;
        self.required = required;
        Ok(())
    }

    pub fn set_default(&mut self, default: Option<Value>) -> Result<()> {
        self.ensure_mutable()?;
        self.default = default;
        Ok(())
    }

    pub fn set_strip(&mut self, strip: bool) -> Result<()> {
        self.ensure_mutable()?;
        self.strip = strip;
        Ok(())
    }

    /// Stack another message layer on top of the existing ones.
    pub fn add_messages(&mut self, layer: MessageLayer) -> Result<()> {
        self.ensure_mutable()?;
        let registry = self.messages.as_ref().clone().with_layer(layer);
        self.messages = Arc::new(registry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn options(config: RuleConfig) -> Result<RuleOptions> {
        RuleOptions::new(config, RuleDefaults::default(), [])
    }

    #[test]
    fn required_by_default() {
        let options = options(RuleConfig::default()).unwrap();
        assert!(options.is_required());
        assert_eq!(options.mode(), ReportMode::Exception);
        assert!(!options.strip());
        assert!(options.messages().contains("empty"));
    }

    #[test]
    fn default_alone_keeps_required() {
        let options = options(RuleConfig::new().default_value(json!(42))).unwrap();
        assert!(options.is_required());
        assert_eq!(options.default_value(), Some(&json!(42)));
    }

    #[test]
    fn required_with_default_is_rejected() {
        let err = options(RuleConfig::new().required(true).default_value(json!(42))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidArguments(_)));
    }

    #[test]
    fn pinned_mode_rejects_other_mode() {
        let defaults = RuleDefaults {
            pinned_mode: Some(ReportMode::Result),
            ..RuleDefaults::default()
        };

        let pinned = RuleOptions::new(RuleConfig::default(), defaults, []).unwrap();
        assert_eq!(pinned.mode(), ReportMode::Result);

        let same = RuleOptions::new(RuleConfig::new().result_mode(), defaults, []).unwrap();
        assert_eq!(same.mode(), ReportMode::Result);

        let err = RuleOptions::new(RuleConfig::new().mode(ReportMode::Exception), defaults, [])
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidArguments(_)));
    }

    #[test]
    fn frozen_after_construction() {
        let mut options = options(RuleConfig::default()).unwrap();
        assert!(options.is_frozen());

        let err = options.set_required(false).unwrap_err();
        assert!(matches!(err, ValidationError::ThreadSafety(_)));

        options.unfreeze();
        options.set_required(false).unwrap();
        options
            .add_messages(MessageLayer::new("extra").message("custom", "Custom."))
            .unwrap();
        options.freeze();

        assert!(!options.is_required());
        assert_eq!(options.messages().template("custom"), Some("Custom."));
        assert!(options.set_strip(true).is_err());
    }
}
