use indexmap::IndexMap;
use serde_json::Value;
use vetter_rule::{bridge, Context};
use vetter_tree::{ErrorShape, RecordValue, RepeatingValue, ResultNode};

/// Active result node as a record. A missing node is created, a field
/// node is upgraded in place keeping its errors.
pub(crate) fn active_record<'a>(context: &'a mut Context, initial_value: &Value) -> Option<&'a mut RecordValue> {
    if !context.has_result() {
        context.install_result(ResultNode::record(initial_value.clone()));
    }
    let node = context.result_mut()?;
    if node.as_record().is_none() {
        bridge::attach_errors(
            node,
            ErrorShape::Record {
                fields: IndexMap::new(),
                global: Vec::new(),
            },
        );
    }
    node.as_record_mut()
}

/// Active result node as a sequence, created or upgraded like [`active_record`].
pub(crate) fn active_repeating<'a>(
    context: &'a mut Context,
    initial_value: &Value,
) -> Option<&'a mut RepeatingValue> {
    if !context.has_result() {
        context.install_result(ResultNode::repeating(initial_value.clone()));
    }
    let node = context.result_mut()?;
    if node.as_repeating().is_none() {
        bridge::attach_errors(
            node,
            ErrorShape::Sequence {
                items: Vec::new(),
                global: Vec::new(),
            },
        );
    }
    node.as_repeating_mut()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vetter_tree::Error;

    use super::*;

    #[test]
    fn upgrades_field_node_keeping_errors() {
        let mut context = Context::new();
        let mut node = ResultNode::field(json!({"a": 1}));
        node.add_error(Error::new("invalid_type", "bad", json!({"a": 1})));
        context.install_result(node);

        let record = active_record(&mut context, &Value::Null).unwrap();
        assert_eq!(record.global_errors().len(), 1);
        assert_eq!(record.initial_value(), &json!({"a": 1}));
    }

    #[test]
    fn creates_missing_sequence_node() {
        let mut context = Context::new();
        let repeating = active_repeating(&mut context, &json!([1, 2])).unwrap();
        assert!(repeating.is_empty());
        assert_eq!(context.result().map(ResultNode::initial_value), Some(&json!([1, 2])));
    }
}
