use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::field::FieldValue;
use crate::record::RecordValue;
use crate::repeating::RepeatingValue;

/// One node of the per-call result tree.
///
/// The shape mirrors the rule that produced it: leaf rules create
/// [`FieldValue`]s, mapping rules [`RecordValue`]s and sequence rules
/// [`RepeatingValue`]s.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultNode {
    Field(FieldValue),
    Record(RecordValue),
    Repeating(RepeatingValue),
}

impl ResultNode {
    pub fn field(initial_value: Value) -> Self {
        Self::Field(FieldValue::new(initial_value))
    }

    pub fn record(initial_value: Value) -> Self {
        Self::Record(RecordValue::new(initial_value))
    }

    pub fn repeating(initial_value: Value) -> Self {
        Self::Repeating(RepeatingValue::new(initial_value))
    }

    pub fn initial_value(&self) -> &Value {
        match self {
            Self::Field(field) => field.initial_value(),
            Self::Record(record) => record.initial_value(),
            Self::Repeating(repeating) => repeating.initial_value(),
        }
    }

    pub fn set_initial_value(&mut self, initial_value: Value) {
        match self {
            Self::Field(field) => field.set_initial_value(initial_value),
            Self::Record(record) => record.set_initial_value(initial_value),
            Self::Repeating(repeating) => repeating.set_initial_value(initial_value),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Field(field) => field.value(),
            Self::Record(record) => record.value(),
            Self::Repeating(repeating) => repeating.value(),
        }
    }

    pub fn set_value(&mut self, value: Value) {
        match self {
            Self::Field(field) => field.set_value(value),
            Self::Record(record) => record.set_value(value),
            Self::Repeating(repeating) => repeating.set_value(value),
        }
    }

    pub fn clear_value(&mut self) {
        match self {
            Self::Field(field) => field.clear_value(),
            Self::Record(record) => record.clear_value(),
            Self::Repeating(repeating) => repeating.clear_value(),
        }
    }

    /// Record an error on this node. Composite nodes keep it as a global error.
    pub fn add_error(&mut self, error: Error) {
        match self {
            Self::Field(field) => field.add_error(error),
            Self::Record(record) => record.add_global_error(error),
            Self::Repeating(repeating) => repeating.add_global_error(error),
        }
    }

    /// Errors stored directly on this node (field errors or globals).
    pub fn own_errors(&self) -> &[Error] {
        match self {
            Self::Field(field) => field.errors(),
            Self::Record(record) => record.global_errors(),
            Self::Repeating(repeating) => repeating.global_errors(),
        }
    }

    /// Errors of this node and its descendants in the node's shape.
    /// Clean children are left out of record shapes and become `None`
    /// slots in sequence shapes.
    pub fn errors(&self) -> ErrorShape {
        match self {
            Self::Field(field) => ErrorShape::Leaf(field.errors().to_vec()),
            Self::Record(record) => ErrorShape::Record {
                fields: record.field_errors(),
                global: record.global_errors().to_vec(),
            },
            Self::Repeating(repeating) => ErrorShape::Sequence {
                items: repeating.item_errors(),
                global: repeating.global_errors().to_vec(),
            },
        }
    }

    pub fn contains_error(&self) -> bool {
        match self {
            Self::Field(field) => field.contains_error(),
            Self::Record(record) => record.contains_error(),
            Self::Repeating(repeating) => repeating.contains_error(),
        }
    }

    pub fn contains_critical_error(&self) -> bool {
        match self {
            Self::Field(field) => field.contains_critical_error(),
            Self::Record(record) => record.contains_critical_error(),
            Self::Repeating(repeating) => repeating.contains_critical_error(),
        }
    }

    pub fn error_count(&self) -> usize {
        match self {
            Self::Field(field) => field.error_count(),
            Self::Record(record) => record.error_count(),
            Self::Repeating(repeating) => repeating.error_count(),
        }
    }

    /// First error in tree order: own errors, then children in order.
    pub fn first_error(&self) -> Option<&Error> {
        if let Some(error) = self.own_errors().first() {
            return Some(error);
        }
        match self {
            Self::Field(_) => None,
            Self::Record(record) => record
                .children()
                .find_map(|(_, child)| child.first_error()),
            Self::Repeating(repeating) => repeating.items().iter().find_map(Self::first_error),
        }
    }

    pub fn meta(&self) -> &Map<String, Value> {
        match self {
            Self::Field(field) => field.meta(),
            Self::Record(record) => record.meta(),
            Self::Repeating(repeating) => repeating.meta(),
        }
    }

    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            Self::Field(field) => field.meta_mut(),
            Self::Record(record) => record.meta_mut(),
            Self::Repeating(repeating) => repeating.meta_mut(),
        }
    }

    pub fn as_field(&self) -> Option<&FieldValue> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RecordValue> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_repeating(&self) -> Option<&RepeatingValue> {
        match self {
            Self::Repeating(repeating) => Some(repeating),
            _ => None,
        }
    }

    pub fn as_repeating_mut(&mut self) -> Option<&mut RepeatingValue> {
        match self {
            Self::Repeating(repeating) => Some(repeating),
            _ => None,
        }
    }
}

impl From<FieldValue> for ResultNode {
    fn from(field: FieldValue) -> Self {
        Self::Field(field)
    }
}

impl From<RecordValue> for ResultNode {
    fn from(record: RecordValue) -> Self {
        Self::Record(record)
    }
}

impl From<RepeatingValue> for ResultNode {
    fn from(repeating: RepeatingValue) -> Self {
        Self::Repeating(repeating)
    }
}

/// Errors of a node arranged in the node's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorShape {
    /// Errors of a field node.
    Leaf(Vec<Error>),
    /// Erroneous fields only, plus record-level errors.
    Record {
        fields: IndexMap<String, ErrorShape>,
        global: Vec<Error>,
    },
    /// One slot per item (`None` for clean items), plus sequence-level errors.
    Sequence {
        items: Vec<Option<ErrorShape>>,
        global: Vec<Error>,
    },
}

impl ErrorShape {
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of errors in this shape, nested ones included.
    pub fn count(&self) -> usize {
        match self {
            Self::Leaf(errors) => errors.len(),
            Self::Record { fields, global } => {
                global.len() + fields.values().map(Self::count).sum::<usize>()
            }
            Self::Sequence { items, global } => {
                global.len() + items.iter().flatten().map(Self::count).sum::<usize>()
            }
        }
    }

    /// First error in tree order: globals before nested entries.
    pub fn first(&self) -> Option<&Error> {
        match self {
            Self::Leaf(errors) => errors.first(),
            Self::Record { fields, global } => global
                .first()
                .or_else(|| fields.values().find_map(Self::first)),
            Self::Sequence { items, global } => global
                .first()
                .or_else(|| items.iter().flatten().find_map(Self::first)),
        }
    }

    /// All errors flattened in tree order.
    pub fn flatten(&self) -> Vec<&Error> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Error>) {
        match self {
            Self::Leaf(errors) => out.extend(errors),
            Self::Record { fields, global } => {
                out.extend(global);
                for shape in fields.values() {
                    shape.collect_into(out);
                }
            }
            Self::Sequence { items, global } => {
                out.extend(global);
                for shape in items.iter().flatten() {
                    shape.collect_into(out);
                }
            }
        }
    }

    pub fn contains_critical_error(&self) -> bool {
        self.flatten().iter().any(|error| error.is_critical)
    }

    /// Nested shape for a record field.
    pub fn field(&self, name: &str) -> Option<&ErrorShape> {
        match self {
            Self::Record { fields, .. } => fields.get(name),
            _ => None,
        }
    }

    /// Nested shape for a sequence item; `None` when the item is clean.
    pub fn item(&self, index: usize) -> Option<&ErrorShape> {
        match self {
            Self::Sequence { items, .. } => items.get(index).and_then(Option::as_ref),
            _ => None,
        }
    }

    /// Errors stored at this level.
    pub fn own(&self) -> &[Error] {
        match self {
            Self::Leaf(errors) => errors,
            Self::Record { global, .. } | Self::Sequence { global, .. } => global,
        }
    }
}
