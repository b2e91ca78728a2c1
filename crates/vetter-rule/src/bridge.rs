//! Conversion between exception-style [`InvalidDataError`]s and result-tree
//! [`Error`]s.
//!
//! The conversion keeps the structure (which field, which position) but is
//! lossy: a single exception surfaces only the first error as its details.
//! Further errors of a field and record/list-level errors are kept as the
//! exception's global errors.

use indexmap::IndexMap;
use serde_json::Value;
use vetter_tree::{Error, ErrorShape, ResultNode};

use crate::error::InvalidDataError;

/// Tree error for the details of `error`.
pub fn error_from_exception(error: &InvalidDataError, is_critical: bool) -> Error {
    let details = error.details();
    Error::new(details.key.clone(), details.message.clone(), details.value.clone())
        .critical(is_critical)
        .with_context(details.context.clone())
}

/// Exception for a single tree error.
pub fn exception_from_error(error: &Error) -> InvalidDataError {
    InvalidDataError::new(
        error.key.clone(),
        error.message.clone(),
        error.value.clone(),
        error.context.clone(),
    )
    .critical(error.is_critical)
}

/// Error shape equivalent to `error`, keeping each nested error's criticality.
///
/// A list in which every position is valid degrades to the error's own
/// details so that no failure is silently lost.
pub fn errors_from_exception(error: &InvalidDataError) -> ErrorShape {
    let global: Vec<Error> = error
        .global_errors()
        .into_iter()
        .map(|own| error_from_exception(own, own.is_critical()))
        .collect();
    if !error.error_dict().is_empty() {
        return ErrorShape::Record {
            fields: error
                .error_dict()
                .iter()
                .map(|(name, nested)| (name.clone(), errors_from_exception(nested)))
                .collect(),
            global,
        };
    }
    if error.error_list().iter().any(Option::is_some) {
        return ErrorShape::Sequence {
            items: error
                .error_list()
                .iter()
                .map(|nested| nested.as_ref().map(errors_from_exception))
                .collect(),
            global,
        };
    }
    if global.is_empty() {
        return ErrorShape::Leaf(vec![error_from_exception(error, error.is_critical())]);
    }
    ErrorShape::Leaf(global)
}

/// Exception equivalent to `shape`, or `None` when the shape holds no error.
///
/// The details are always the first error in tree order. A field with
/// several errors keeps all of them as global errors, as does a record or
/// sequence for its own errors.
pub fn exception_from_errors(shape: &ErrorShape) -> Option<InvalidDataError> {
    let primary = exception_from_error(shape.first()?);
    match shape {
        ErrorShape::Leaf(errors) if errors.len() == 1 => Some(primary),
        ErrorShape::Leaf(errors) => Some(primary.with_global_errors(exceptions_from(errors))),
        ErrorShape::Record { fields, global } => {
            let dict: IndexMap<String, InvalidDataError> = fields
                .iter()
                .filter_map(|(name, nested)| {
                    exception_from_errors(nested).map(|error| (name.clone(), error))
                })
                .collect();
            if dict.is_empty() {
                return exception_from_errors(&ErrorShape::Leaf(global.clone()));
            }
            Some(primary.with_error_dict(dict).with_global_errors(exceptions_from(global)))
        }
        ErrorShape::Sequence { items, global } => {
            let list: Vec<Option<InvalidDataError>> = items
                .iter()
                .map(|nested| nested.as_ref().and_then(exception_from_errors))
                .collect();
            if list.iter().all(Option::is_none) {
                return exception_from_errors(&ErrorShape::Leaf(global.clone()));
            }
            Some(primary.with_error_list(list).with_global_errors(exceptions_from(global)))
        }
    }
}

fn exceptions_from(errors: &[Error]) -> Vec<InvalidDataError> {
    errors.iter().map(exception_from_error).collect()
}

/// Exception for all errors reachable from `node`.
pub fn exception_from_node(node: &ResultNode) -> Option<InvalidDataError> {
    exception_from_errors(&node.errors())
}

/// Record the errors of `error` on `node`.
pub fn attach_exception(node: &mut ResultNode, error: &InvalidDataError) {
    attach_errors(node, errors_from_exception(error));
}

/// Merge `shape` into `node`, turning a field node into a record or
/// sequence node when the shape requires nested slots. Errors already on a
/// field node become global errors of the new composite node.
pub fn attach_errors(node: &mut ResultNode, shape: ErrorShape) {
    match shape {
        ErrorShape::Leaf(errors) => {
            for error in errors {
                node.add_error(error);
            }
        }
        ErrorShape::Record { fields, global } => {
            if node.as_record().is_none() {
                *node = upgrade(node, ResultNode::record(node.initial_value().clone()));
            }
            for error in global {
                node.add_error(error);
            }
            if let Some(record) = node.as_record_mut() {
                for (name, nested) in fields {
                    attach_errors(record.child_or_insert(&name), nested);
                }
            }
        }
        ErrorShape::Sequence { items, global } => {
            if node.as_repeating().is_none() {
                *node = upgrade(node, ResultNode::repeating(node.initial_value().clone()));
            }
            for error in global {
                node.add_error(error);
            }
            let initial = node.initial_value().clone();
            if let Some(repeating) = node.as_repeating_mut() {
                for (index, nested) in items.into_iter().enumerate() {
                    while repeating.len() <= index {
                        let position = repeating.len();
                        let item_initial = initial.get(position).cloned().unwrap_or(Value::Null);
                        repeating.push(ResultNode::field(item_initial));
                    }
                    if let (Some(nested), Some(item)) = (nested, repeating.item_mut(index)) {
                        attach_errors(item, nested);
                    }
                }
            }
        }
    }
}

fn upgrade(old: &ResultNode, mut new: ResultNode) -> ResultNode {
    for error in old.own_errors() {
        new.add_error(error.clone());
    }
    *new.meta_mut() = old.meta().clone();
    new
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::error::Unpacked;

    fn error(key: &str) -> Error {
        Error::new(key, format!("{key} message"), json!(21))
    }

    #[test]
    fn simple_error_becomes_leaf_exception() {
        let exception = exception_from_errors(&ErrorShape::Leaf(vec![error("foo")])).unwrap();

        assert_eq!(exception.details().key, "foo");
        assert_eq!(exception.details().message, "foo message");
        assert_eq!(exception.details().value, json!(21));
        assert!(exception.is_leaf());
    }

    #[test]
    fn sparse_list_keeps_valid_slots() {
        let shape = ErrorShape::Sequence {
            items: vec![
                Some(ErrorShape::Leaf(vec![error("foo")])),
                None,
                Some(ErrorShape::Leaf(vec![error("bar")])),
            ],
            global: Vec::new(),
        };
        let exception = exception_from_errors(&shape).unwrap();

        let errors = exception.errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].map(InvalidDataError::key), Some("foo"));
        assert!(errors[1].is_none());
        assert_eq!(errors[2].map(InvalidDataError::key), Some("bar"));
        assert_eq!(exception.details().key, "foo");
    }

    #[test]
    fn nested_dicts_and_lists() {
        let mut id = IndexMap::new();
        id.insert("id".to_string(), ErrorShape::Leaf(vec![error("foobar")]));
        let mut fields = IndexMap::new();
        fields.insert(
            "foo".to_string(),
            ErrorShape::Sequence {
                items: vec![Some(ErrorShape::Record {
                    fields: id,
                    global: Vec::new(),
                })],
                global: Vec::new(),
            },
        );
        let exception = exception_from_errors(&ErrorShape::Record {
            fields,
            global: Vec::new(),
        })
        .unwrap();

        assert_eq!(exception.details().key, "foobar");
        let foo = exception.error_for("foo").unwrap();
        assert_eq!(foo.error_list().len(), 1);
        let item = foo.error_list()[0].as_ref().unwrap();
        let id = item.error_for("id").unwrap();
        assert!(id.is_leaf());
        assert!(matches!(
            exception.unpack_errors().get("foo").and_then(|u| u.item(0)).and_then(|u| u.get("id")),
            Some(Unpacked::Leaf(_))
        ));
    }

    #[test]
    fn record_with_only_globals_is_leaf() {
        let exception = exception_from_errors(&ErrorShape::Record {
            fields: IndexMap::new(),
            global: vec![error("invalid_type")],
        })
        .unwrap();

        assert_eq!(exception.key(), "invalid_type");
        assert!(exception.is_leaf());
    }

    #[test]
    fn empty_shape_has_no_exception() {
        assert!(exception_from_errors(&ErrorShape::Leaf(Vec::new())).is_none());
        assert!(exception_from_node(&ResultNode::record(json!({}))).is_none());
    }

    #[test]
    fn exception_round_trips_structure() {
        let mut fields = IndexMap::new();
        fields.insert("number".to_string(), ErrorShape::Leaf(vec![error("bad").critical(false)]));
        let shape = ErrorShape::Sequence {
            items: vec![None, Some(ErrorShape::Record { fields, global: Vec::new() })],
            global: Vec::new(),
        };
        let exception = exception_from_errors(&shape).unwrap();

        assert_eq!(errors_from_exception(&exception), shape);
    }

    #[test]
    fn attach_upgrades_field_node() {
        let mut node = ResultNode::field(json!([1, "x"]));
        node.add_error(error("global"));
        let shape = ErrorShape::Sequence {
            items: vec![None, Some(ErrorShape::Leaf(vec![error("invalid_number")]))],
            global: Vec::new(),
        };
        attach_errors(&mut node, shape);

        let repeating = node.as_repeating().unwrap();
        assert_eq!(repeating.global_errors().len(), 1);
        assert_eq!(repeating.len(), 2);
        assert_eq!(repeating.item(1).unwrap().initial_value(), &json!("x"));
        assert_eq!(node.error_count(), 2);
    }

    #[test]
    fn field_with_several_errors_stays_a_field() {
        let shape = ErrorShape::Leaf(vec![error("too_short").critical(false), error("bad_pattern")]);
        let exception = exception_from_errors(&shape).unwrap();

        assert_eq!(exception.key(), "too_short");
        assert!(exception.is_leaf());
        assert!(exception.error_list().is_empty());
        assert_eq!(errors_from_exception(&exception), shape);

        let mut node = ResultNode::field(json!("x"));
        attach_exception(&mut node, &exception);
        let field = node.as_field().unwrap();
        assert_eq!(field.errors().len(), 2);
        assert!(field.errors()[1].is_critical);
        assert_eq!(node.initial_value(), &json!("x"));
    }

    #[test]
    fn every_global_error_stays_reachable() {
        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), ErrorShape::Leaf(vec![error("invalid_number")]));
        let shape = ErrorShape::Record {
            fields,
            global: vec![error("g1"), error("g2").critical(false)],
        };
        let exception = exception_from_errors(&shape).unwrap();

        assert_eq!(exception.key(), "g1");
        assert_eq!(exception.error_dict().keys().collect::<Vec<_>>(), ["id"]);
        let global: Vec<_> = exception.global_errors().into_iter().map(InvalidDataError::key).collect();
        assert_eq!(global, ["g1", "g2"]);
        assert_eq!(exception.unpack_errors().global().len(), 2);
        assert_eq!(errors_from_exception(&exception), shape);
    }

    #[test]
    fn sequence_globals_survive_round_trip() {
        let shape = ErrorShape::Sequence {
            items: vec![None, Some(ErrorShape::Leaf(vec![error("invalid_number")]))],
            global: vec![error("too_long").critical(false)],
        };
        let exception = exception_from_errors(&shape).unwrap();

        assert_eq!(exception.key(), "too_long");
        assert_eq!(exception.errors().len(), 2);
        assert_eq!(errors_from_exception(&exception), shape);
    }

    #[test]
    fn attach_leaf_exception_to_field() {
        let exception = InvalidDataError::new("too_low", "too low", json!(4), Map::new()).critical(false);
        let mut node = ResultNode::field(json!(4));
        attach_exception(&mut node, &exception);

        assert_eq!(node.error_count(), 1);
        assert!(!node.contains_critical_error());
        assert_eq!(error_from_exception(&exception, true).key, "too_low");
    }
}
