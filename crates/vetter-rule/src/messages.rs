//! Message templates and their rendering.
//!
//! Every rule type contributes a [`MessageLayer`] with the keys it declares.
//! Layers are stacked from the most generic to the most specific when a rule
//! is built; a later layer wins on key conflicts. Each key remembers the
//! layer that owns it, and rendering always uses that layer's hooks
//! (template lookup, translation parameters, translator). A layer that does
//! not set a hook inherits it from the layer below, so a rule type can add
//! keys without changing how inherited keys are translated.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{Result, ValidationError};

/// Translation domain passed to translators by default.
pub const DEFAULT_DOMAIN: &str = "vetter";

/// Returns translation parameters (domain, locale hints) for a call.
pub type ParameterHook = Arc<dyn Fn(&Context) -> Map<String, Value> + Send + Sync>;

/// Alternative template source; `None` falls back to the declared template.
pub type TemplateLookup = Arc<dyn Fn(&str, &Context) -> Option<String> + Send + Sync>;

/// Turns a native template into the template for the caller's locale.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        key: &str,
        native_message: &str,
        parameters: &Map<String, Value>,
        context: &Context,
    ) -> String;
}

/// Translator that returns the native template unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTranslator;

impl Translator for NativeTranslator {
    fn translate(
        &self,
        _key: &str,
        native_message: &str,
        _parameters: &Map<String, Value>,
        _context: &Context,
    ) -> String {
        native_message.to_string()
    }
}

/// Templates declared by one rule type plus optional rendering hooks.
#[derive(Clone, Default)]
pub struct MessageLayer {
    name: String,
    templates: IndexMap<String, String>,
    parameters: Option<ParameterHook>,
    translator: Option<Arc<dyn Translator>>,
    lookup: Option<TemplateLookup>,
}

impl MessageLayer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn message(mut self, key: &str, template: &str) -> Self {
        self.templates.insert(key.to_string(), template.to_string());
        self
    }

    pub fn parameters<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.parameters = Some(Arc::new(hook));
        self
    }

    pub fn translator<T>(mut self, translator: T) -> Self
    where
        T: Translator + 'static,
    {
        self.translator = Some(Arc::new(translator));
        self
    }

    pub fn lookup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &Context) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl fmt::Debug for MessageLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageLayer")
            .field("name", &self.name)
            .field("templates", &self.templates)
            .field("parameters", &self.parameters.is_some())
            .field("translator", &self.translator.is_some())
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}

#[derive(Clone)]
struct Hooks {
    parameters: ParameterHook,
    translator: Arc<dyn Translator>,
    lookup: Option<TemplateLookup>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            parameters: Arc::new(default_parameters),
            translator: Arc::new(NativeTranslator),
            lookup: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    template: String,
    owner: usize,
}

/// Resolved key → (template, owning layer) table of a rule instance.
#[derive(Clone, Default)]
pub struct MessageRegistry {
    layers: Vec<(String, Hooks)>,
    entries: IndexMap<String, Entry>,
}

impl MessageRegistry {
    /// Stack `layers` from generic to specific.
    pub fn new(layers: impl IntoIterator<Item = MessageLayer>) -> Self {
        let mut registry = Self::default();
        for layer in layers {
            registry.push_layer(layer);
        }
        registry
    }

    /// Stack one more layer on top.
    pub fn with_layer(mut self, layer: MessageLayer) -> Self {
        self.push_layer(layer);
        self
    }

    fn push_layer(&mut self, layer: MessageLayer) {
        let inherited = self
            .layers
            .last()
            .map(|(_, hooks)| hooks.clone())
            .unwrap_or_default();
        let hooks = Hooks {
            parameters: layer.parameters.unwrap_or(inherited.parameters),
            translator: layer.translator.unwrap_or(inherited.translator),
            lookup: layer.lookup.or(inherited.lookup),
        };
        let owner = self.layers.len();
        self.layers.push((layer.name, hooks));
        for (key, template) in layer.templates {
            self.entries.insert(key, Entry { template, owner });
        }
    }

    /// Replace templates for existing keys (keeping their owner) and add
    /// new keys to the most specific layer.
    pub fn with_overrides(mut self, overrides: &IndexMap<String, String>) -> Self {
        if overrides.is_empty() {
            return self;
        }
        if self.layers.is_empty() {
            self.push_layer(MessageLayer::new("custom"));
        }
        let last = self.layers.len() - 1;
        for (key, template) in overrides {
            match self.entries.get_mut(key) {
                Some(entry) => entry.template = template.clone(),
                None => {
                    self.entries.insert(
                        key.clone(),
                        Entry {
                            template: template.clone(),
                            owner: last,
                        },
                    );
                }
            }
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Declared (untranslated) template for `key`.
    pub fn template(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.template.as_str())
    }

    /// Name of the layer that owns `key`.
    pub fn owner(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|entry| self.layers.get(entry.owner))
            .map(|(name, _)| name.as_str())
    }

    /// Translation parameters the owning layer provides for `key`.
    pub fn translation_parameters(&self, key: &str, context: &Context) -> Option<Map<String, Value>> {
        let (_, hooks) = self.hooks_for(key)?;
        Some((hooks.parameters)(context))
    }

    /// Look up, translate and interpolate the message for `key`.
    pub fn render(&self, key: &str, context: &Context, values: &Map<String, Value>) -> Result<String> {
        let (entry, hooks) = self.hooks_for(key).ok_or_else(|| {
            ValidationError::invalid_arguments(format!("unknown message key {key:?}"))
        })?;
        let native = hooks
            .lookup
            .as_ref()
            .and_then(|lookup| lookup(key, context))
            .unwrap_or_else(|| entry.template.clone());
        let parameters = (hooks.parameters)(context);
        let translated = hooks.translator.translate(key, &native, &parameters, context);
        interpolate(&translated, values)
    }

    fn hooks_for(&self, key: &str) -> Option<(&Entry, &Hooks)> {
        let entry = self.entries.get(key)?;
        let (_, hooks) = self.layers.get(entry.owner)?;
        Some((entry, hooks))
    }
}

impl fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: Vec<&str> = self.layers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("MessageRegistry")
            .field("layers", &layers)
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|(key, entry)| (key.as_str(), entry.template.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl PartialEq for MessageRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(key, entry)| {
                other.template(key) == Some(entry.template.as_str())
                    && other.owner(key) == self.owner(key)
            })
    }
}

fn default_parameters(_context: &Context) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert("domain".to_string(), Value::String(DEFAULT_DOMAIN.to_string()));
    parameters
}

/// Substitute `%(name)s`-style placeholders.
///
/// Supported conversions: `s` (plain), `d`/`i` (integer), `r` (quoted),
/// `f` (six decimals). `%%` is a literal percent sign.
pub fn interpolate(template: &str, values: &Map<String, Value>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some(after) = tail.strip_prefix('%') {
            out.push('%');
            rest = after;
            continue;
        }
        let Some(spec) = tail.strip_prefix('(') else {
            out.push('%');
            rest = tail;
            continue;
        };
        let close = spec.find(')').ok_or_else(|| {
            ValidationError::invalid_arguments(format!("unterminated placeholder in {template:?}"))
        })?;
        let name = &spec[..close];
        let mut chars = spec[close + 1..].chars();
        let conversion = chars.next().ok_or_else(|| {
            ValidationError::invalid_arguments(format!("placeholder {name:?} has no conversion"))
        })?;
        let value = values.get(name).ok_or_else(|| {
            ValidationError::invalid_arguments(format!("no value for placeholder {name:?}"))
        })?;
        out.push_str(&format_value(name, value, conversion)?);
        rest = chars.as_str();
    }
    out.push_str(rest);
    Ok(out)
}

fn format_value(name: &str, value: &Value, conversion: char) -> Result<String> {
    match conversion {
        's' => Ok(plain(value)),
        'r' => Ok(match value {
            Value::String(text) => format!("'{text}'"),
            other => other.to_string(),
        }),
        'd' | 'i' => {
            if let Some(number) = value.as_i64() {
                Ok(number.to_string())
            } else if let Some(number) = value.as_u64() {
                Ok(number.to_string())
            } else if let Some(number) = value.as_f64() {
                Ok((number.trunc() as i64).to_string())
            } else {
                Err(ValidationError::invalid_arguments(format!(
                    "placeholder {name:?} requires a number, got {value}"
                )))
            }
        }
        'f' => value
            .as_f64()
            .map(|number| format!("{number:.6}"))
            .ok_or_else(|| {
                ValidationError::invalid_arguments(format!(
                    "placeholder {name:?} requires a number, got {value}"
                ))
            }),
        other => Err(ValidationError::invalid_arguments(format!(
            "unsupported conversion '{other}' for placeholder {name:?}"
        ))),
    }
}

/// Text form of a value without JSON quoting for strings.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}
