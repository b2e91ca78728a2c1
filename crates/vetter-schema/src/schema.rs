use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::{trace, warn};
use vetter_rule::rules::type_name;
use vetter_rule::{
    bridge, outcome_into_node, process_scoped, Context, MessageLayer, ReportMode, Result, Rule,
    RuleDefaults, RuleOptions, ValidationError,
};
use vetter_tree::ResultNode;

use crate::config::SchemaConfig;
use crate::scope::active_record;

pub(crate) fn schema_layer() -> MessageLayer {
    MessageLayer::new("schema")
        .message(
            "invalid_type",
            r#"Validator got unexpected input (expected "dict", got "%(classname)s")."#,
        )
        .message("additional_item", r#"Undefined field "%(additional_item)s"."#)
}

fn check_parameters(allow_additional: bool, filter_unvalidated: bool) -> Result<()> {
    if !allow_additional && !filter_unvalidated {
        return Err(ValidationError::invalid_arguments(
            "additional parameters are rejected, so they can not be passed through unvalidated",
        ));
    }
    Ok(())
}

/// Collects fields, whole-record rules and options for a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    config: SchemaConfig,
    fields: IndexMap<String, Arc<dyn Rule>>,
    form_rules: Vec<Arc<dyn Rule>>,
    layers: Vec<MessageLayer>,
}

impl SchemaBuilder {
    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Register `rule` for `name`. Registering a name again replaces the
    /// rule but keeps the field's position.
    pub fn field<R: Rule + 'static>(self, name: &str, rule: R) -> Self {
        self.shared_field(name, Arc::new(rule))
    }

    pub fn shared_field(mut self, name: &str, rule: Arc<dyn Rule>) -> Self {
        self.fields.insert(name.to_string(), rule);
        self
    }

    /// Append a whole-record rule. It receives the mapping of converted field values.
    pub fn form_rule<R: Rule + 'static>(self, rule: R) -> Self {
        self.shared_form_rule(Arc::new(rule))
    }

    pub fn shared_form_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.form_rules.push(rule);
        self
    }

    /// Stack a message layer on top of the schema's own messages.
    pub fn messages(mut self, layer: MessageLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let SchemaConfig {
            allow_additional_parameters,
            filter_unvalidated_parameters,
            rule,
        } = self.config;
        check_parameters(allow_additional_parameters, filter_unvalidated_parameters)?;
        let layers = std::iter::once(schema_layer()).chain(self.layers);
        Ok(Schema {
            options: RuleOptions::new(rule, RuleDefaults::default(), layers)?,
            fields: self.fields,
            form_rules: self.form_rules,
            allow_additional_parameters,
            filter_unvalidated_parameters,
        })
    }
}

/// Validates a mapping field by field, then runs whole-record rules on the
/// converted values.
///
/// Field rules run in declaration order, each with its own result node,
/// which ends up as the field's child in the schema's record node. A nested
/// schema therefore produces a nested record. In exception mode any field
/// error stops processing before the whole-record rules; in result mode all
/// fields and rules run and every violation is recorded.
///
/// ```
/// use serde_json::json;
/// use vetter_rule::{Context, IntegerRule, Outcome, Rule};
/// use vetter_schema::Schema;
///
/// let schema = Schema::builder().field("id", IntegerRule::new()?).build()?;
/// let outcome = schema.process(json!({"id": "42"}), &mut Context::new())?;
/// assert_eq!(outcome, Outcome::Value(json!({"id": 42})));
/// # Ok::<(), vetter_rule::ValidationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    options: RuleOptions,
    fields: IndexMap<String, Arc<dyn Rule>>,
    form_rules: Vec<Arc<dyn Rule>>,
    allow_additional_parameters: bool,
    filter_unvalidated_parameters: bool,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Schema without fields. Add them with [`Schema::add`] after unfreezing.
    pub fn new(config: SchemaConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Arc<dyn Rule>)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn rule_for(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.fields.get(name)
    }

    pub fn form_rules(&self) -> &[Arc<dyn Rule>] {
        &self.form_rules
    }

    pub fn allows_additional_parameters(&self) -> bool {
        self.allow_additional_parameters
    }

    pub fn filters_unvalidated_parameters(&self) -> bool {
        self.filter_unvalidated_parameters
    }

    pub fn add(&mut self, name: &str, rule: Arc<dyn Rule>) -> Result<()> {
        self.options.ensure_mutable()?;
        self.fields.insert(name.to_string(), rule);
        Ok(())
    }

    pub fn add_form_rule(&mut self, rule: Arc<dyn Rule>) -> Result<()> {
        self.options.ensure_mutable()?;
        self.form_rules.push(rule);
        Ok(())
    }

    pub fn set_allow_additional_parameters(&mut self, allow: bool) -> Result<()> {
        self.options.ensure_mutable()?;
        check_parameters(allow, self.filter_unvalidated_parameters)?;
        self.allow_additional_parameters = allow;
        Ok(())
    }

    pub fn set_filter_unvalidated_parameters(&mut self, filter: bool) -> Result<()> {
        self.options.ensure_mutable()?;
        check_parameters(self.allow_additional_parameters, filter)?;
        self.filter_unvalidated_parameters = filter;
        Ok(())
    }

    /// Add the fields of `other` this schema does not declare yet, and
    /// append all of its whole-record rules.
    pub fn add_missing_rules(&mut self, other: &Schema) -> Result<()> {
        self.options.ensure_mutable()?;
        for (name, rule) in &other.fields {
            if !self.fields.contains_key(name) {
                self.fields.insert(name.clone(), Arc::clone(rule));
            }
        }
        self.form_rules.extend(other.form_rules.iter().cloned());
        Ok(())
    }

    /// Run every field rule against `input`. Returns the converted values
    /// and one result node per declared field and rejected extra key.
    fn process_fields(
        &self,
        input: &Map<String, Value>,
        context: &mut Context,
    ) -> Result<(Map<String, Value>, IndexMap<String, ResultNode>)> {
        let mut values = Map::new();
        let mut children = IndexMap::new();

        for (name, rule) in &self.fields {
            let raw = match input.get(name) {
                Some(value) => value.clone(),
                None => rule.empty_value(context),
            };
            trace!(field = %name, "processing field");
            let outcome = process_scoped(rule.as_ref(), raw.clone(), context);
            let node = outcome_into_node(rule.as_ref(), raw, outcome)?;
            if let Some(value) = node.value() {
                values.insert(name.clone(), value.clone());
            }
            children.insert(name.clone(), node);
        }

        for (name, raw) in input {
            if self.fields.contains_key(name) {
                continue;
            }
            if !self.allow_additional_parameters {
                let params = json!({"additional_item": name});
                let error = self.error("additional_item", raw, context, params, false)?;
                let mut node = ResultNode::field(raw.clone());
                node.add_error(error);
                children.insert(name.clone(), node);
            } else if !self.filter_unvalidated_parameters {
                values.insert(name.clone(), raw.clone());
            }
        }
        Ok((values, children))
    }

    /// Run whole-record rules in order, each on the output of the previous
    /// one. Stops after the first rule that records an error.
    fn process_form_rules(&self, mut values: Map<String, Value>, context: &mut Context) -> Result<Value> {
        for (index, rule) in self.form_rules.iter().enumerate() {
            let before = context.error_count();
            let input = Value::Object(values.clone());
            trace!(index, "running form rule");
            let outcome = process_scoped(rule.as_ref(), input.clone(), context);
            let node = outcome_into_node(rule.as_ref(), input, outcome)?;
            if let Some(target) = context.result_mut() {
                bridge::attach_errors(target, node.errors());
            }
            if context.error_count() > before {
                trace!(index, "form rule recorded errors, skipping the rest");
                break;
            }
            match node.value() {
                Some(Value::Object(output)) => values = output.clone(),
                Some(other) => {
                    warn!(index, output = %other, "form rule returned a non-mapping value");
                    return Err(ValidationError::invalid_arguments(format!(
                        "whole-record rule must produce a mapping, got {other}"
                    )));
                }
                None => {}
            }
        }
        Ok(Value::Object(values))
    }
}

impl Rule for Schema {
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
        let input = match value {
            Value::Null => Map::new(),
            Value::Object(input) => input,
            other => {
                let params = json!({"classname": type_name(&other)});
                self.new_error("invalid_type", &other, context, params, true)?;
                return Ok(other);
            }
        };

        let (values, children) = self.process_fields(&input, context)?;
        let field_errors = children.values().any(ResultNode::contains_error);
        if let Some(record) = active_record(context, &Value::Object(input)) {
            for (name, child) in children {
                record.insert(name, child);
            }
        }

        if field_errors && self.mode() == ReportMode::Exception {
            return Ok(Value::Object(values));
        }
        self.process_form_rules(values, context)
    }
}
