use regex::Regex;
use serde_json::{json, Map, Value};
use vetter_rule::rules::type_name;
use vetter_rule::{Context, MessageLayer, Result, Rule, RuleConfig, RuleDefaults, RuleOptions, ValidationError};
use vetter_tree::ResultNode;

use crate::schema::{schema_layer, Schema};
use crate::scope::active_record;

/// Name of the synthetic field holding unparsed surplus text.
pub const EXTRA_FIELD: &str = "_extra";

fn positional_layer() -> MessageLayer {
    MessageLayer::new("positional")
        .message(
            "invalid_type",
            r#"Validator got unexpected input (expected string, got "%(classname)s")."#,
        )
        .message("additional_item", r#"Unknown parameter "%(additional_item)s""#)
}

/// Parses a comma separated parameter string such as `"fnord, 42"` into
/// named fields and validates them with a [`Schema`].
///
/// Parameters are assigned by position. Missing trailing parameters are
/// `null`; text beyond the last declared parameter is reported on the
/// synthetic [`EXTRA_FIELD`]. `null` and `""` mean "no parameters".
#[derive(Debug, Clone)]
pub struct PositionalSchema {
    options: RuleOptions,
    schema: Schema,
    parameter_order: Vec<String>,
    separator: Regex,
}

impl PositionalSchema {
    /// Wrap `schema`; its field order is the parameter order.
    pub fn new(schema: Schema) -> Result<Self> {
        let config = RuleConfig::new().mode(schema.mode());
        Self::with_config(schema, config)
    }

    pub fn with_config(schema: Schema, config: RuleConfig) -> Result<Self> {
        let separator = Regex::new(r"\s*,\s*")
            .map_err(|err| ValidationError::invalid_arguments(err.to_string()))?;
        Ok(Self {
            options: RuleOptions::new(config, RuleDefaults::default(), [schema_layer(), positional_layer()])?,
            parameter_order: schema.field_names().map(str::to_string).collect(),
            schema,
            separator,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn parameter_order(&self) -> &[String] {
        &self.parameter_order
    }

    /// Every name must be a field of the wrapped schema.
    pub fn set_parameter_order<I, S>(&mut self, order: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.ensure_mutable()?;
        let order: Vec<String> = order.into_iter().map(Into::into).collect();
        if let Some(unknown) = order.iter().find(|name| self.schema.rule_for(name).is_none()) {
            return Err(ValidationError::invalid_arguments(format!(
                "parameter {unknown:?} is not a field of the schema"
            )));
        }
        self.parameter_order = order;
        Ok(())
    }

    /// Split `text` into the named parameters plus optional surplus text.
    fn split(&self, text: &str) -> (Map<String, Value>, Option<String>) {
        let text = text.trim();
        let parts: Vec<&str> = if text.is_empty() {
            Vec::new()
        } else {
            self.separator
                .splitn(text, self.parameter_order.len() + 1)
                .collect()
        };

        let mut fields = Map::new();
        for (index, name) in self.parameter_order.iter().enumerate() {
            let value = parts
                .get(index)
                .map_or(Value::Null, |part| Value::String(part.to_string()));
            fields.insert(name.clone(), value);
        }
        let extra = parts.get(self.parameter_order.len()).map(|part| part.to_string());
        (fields, extra)
    }
}

impl Rule for PositionalSchema {
    fn options(&self) -> &RuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut RuleOptions {
        &mut self.options
    }

    fn is_empty(&self, _value: &Value, _context: &Context) -> bool {
        false
    }

    fn empty_value(&self, _context: &Context) -> Value {
        Value::Object(Map::new())
    }

    fn new_result(&self, initial_value: Value) -> ResultNode {
        ResultNode::record(initial_value)
    }

    fn convert(&self, value: Value, context: &mut Context) -> Result<Value> {
        let text = match &value {
            Value::Null => "",
            Value::String(text) => text.as_str(),
            other => {
                let params = json!({"classname": type_name(other)});
                self.new_error("invalid_type", other, context, params, true)?;
                return Ok(other.clone());
            }
        };
        let (fields, extra) = self.split(text);
        let converted = self.schema.convert(Value::Object(fields), context)?;

        if let Some(extra) = extra {
            let raw = Value::String(extra);
            let error = self.error("additional_item", &raw, context, json!({"additional_item": raw}), false)?;
            let mut node = ResultNode::field(raw);
            node.add_error(error);
            if let Some(record) = active_record(context, &value) {
                record.insert(EXTRA_FIELD, node);
            }
        }
        Ok(converted)
    }
}
