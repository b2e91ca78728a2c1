use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::{json, Map, Value};
use tracing::debug;
use vetter_rule::{Context, MessageLayer, Result, Rule, RuleDefaults, RuleOptions, ValidationError};

use crate::config::JsonSchemaConfig;

/// Validates a value against a JSON Schema document.
///
/// The document is compiled once at construction. Every violation becomes
/// a critical `schema_violation` error, up to `max_errors` per value.
#[derive(Clone)]
pub struct JsonSchemaRule {
    options: RuleOptions,
    schema: Value,
    validator: Arc<Validator>,
    max_errors: usize,
}

impl JsonSchemaRule {
    pub fn new(schema: &Value) -> Result<Self> {
        Self::with_config(schema, JsonSchemaConfig::default())
    }

    /// Parse and compile a schema given as JSON text.
    pub fn from_json(schema_json: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(schema_json)?;
        Self::new(&schema)
    }

    pub fn with_config(schema: &Value, config: JsonSchemaConfig) -> Result<Self> {
        let mut schema_to_compile = schema.clone();
        if config.strict_mode {
            apply_strict_mode(&mut schema_to_compile);
        }

        let validator = jsonschema::validator_for(&schema_to_compile).map_err(|err| {
            ValidationError::invalid_arguments(format!("failed to compile schema: {err}"))
        })?;
        let layer = MessageLayer::new("json_schema").message("schema_violation", "%(error)s");

        Ok(Self {
            options: RuleOptions::new(config.rule, RuleDefaults::default(), [layer])?,
            schema: schema_to_compile,
            validator: Arc::new(validator),
            max_errors: config.max_errors.max(1),
        })
    }

    /// The compiled document, after strict mode was applied.
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl fmt::Debug for JsonSchemaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaRule")
            .field("options", &self.options)
            .field("schema", &self.schema)
            .field("max_errors", &self.max_errors)
            .finish_non_exhaustive()
    }
}

impl Rule for JsonSchemaRule {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn validate(&self, value: &Value, context: &mut Context) -> Result<()> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(value)
            .take(self.max_errors)
            .map(|err| err.to_string())
            .collect();
        if !violations.is_empty() {
            debug!(violations = violations.len(), "value violates json schema");
        }
        for violation in violations {
            self.new_error("schema_violation", value, context, json!({"error": violation}), true)?;
        }
        Ok(())
    }
}

/// Inject `additionalProperties: false` into every object schema that does
/// not set it.
fn apply_strict_mode(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_object_schema(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            recurse_subschemas(map);
        }
        Value::Array(items) => {
            for item in items {
                apply_strict_mode(item);
            }
        }
        _ => {}
    }
}

fn recurse_subschemas(map: &mut Map<String, Value>) {
    const SCHEMA_MAPS: [&str; 5] = [
        "properties",
        "patternProperties",
        "dependentSchemas",
        "$defs",
        "definitions",
    ];
    const SINGLE_SCHEMAS: [&str; 11] = [
        "propertyNames",
        "additionalProperties",
        "unevaluatedProperties",
        "items",
        "contains",
        "additionalItems",
        "unevaluatedItems",
        "not",
        "if",
        "then",
        "else",
    ];
    const SCHEMA_LISTS: [&str; 4] = ["prefixItems", "allOf", "anyOf", "oneOf"];

    for key in SCHEMA_MAPS {
        if let Some(Value::Object(schemas)) = map.get_mut(key) {
            for schema in schemas.values_mut() {
                apply_strict_mode(schema);
            }
        }
    }
    for key in SINGLE_SCHEMAS.into_iter().chain(SCHEMA_LISTS) {
        if let Some(schema) = map.get_mut(key) {
            apply_strict_mode(schema);
        }
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    const OBJECT_KEYWORDS: [&str; 8] = [
        "properties",
        "patternProperties",
        "additionalProperties",
        "unevaluatedProperties",
        "required",
        "dependentRequired",
        "dependentSchemas",
        "propertyNames",
    ];

    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => OBJECT_KEYWORDS.iter().any(|keyword| map.contains_key(*keyword)),
    }
}
